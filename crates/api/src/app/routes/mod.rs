use axum::{routing::get, Router};

pub mod business;
pub mod categories;
pub mod customers;
pub mod industries;
pub mod ledger;
pub mod measurements;
pub mod products;
pub mod system;
pub mod tasks;

/// Protected routes: everything here runs behind the auth middleware and
/// sees the tenant/principal contexts it inserts.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .route("/business", get(business::get_business))
        .nest("/customers", customers::router())
        .nest("/categories", categories::router())
        .nest("/products", products::router())
        .route("/ledger", get(ledger::list_ledger))
        .nest("/measurements", measurements::router())
        .nest("/tasks", tasks::router())
}
