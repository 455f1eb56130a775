//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store wiring behind trait objects
//! - `routes/`: HTTP routes + handlers (one file per domain area)
//! - `dto.rs`: request DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, routing::post, Extension, Router};
use tower::ServiceBuilder;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
///
/// `/health`, `/industries` and `/business/register` are public; everything
/// else requires a valid bearer token, from which the tenant and principal
/// contexts are derived.
pub fn build_app(jwt_secret: String, services: Arc<services::AppServices>) -> Router {
    let jwt = Arc::new(shoploom_auth::Hs256JwtValidator::new(jwt_secret.into_bytes()));
    let auth_state = middleware::AuthState { jwt };

    let protected = routes::router().layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_middleware,
    ));

    Router::new()
        .route("/health", get(routes::system::health))
        .route("/industries", get(routes::industries::list_industries))
        .route("/business/register", post(routes::business::register_business))
        .merge(protected)
        .layer(Extension(services))
        .layer(ServiceBuilder::new())
}
