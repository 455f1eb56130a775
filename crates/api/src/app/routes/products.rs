use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;

use shoploom_catalog::{NewProduct, Product, ProductFilter, ProductPatch};
use shoploom_core::{DomainError, ProductId, TenantId};
use shoploom_inventory::ChangeType;
use shoploom_tenancy as tenancy;

use crate::app::{dto, errors, services::AppServices};
use crate::authz;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/low_stock", get(low_stock_products))
        .route("/out_of_stock", get(out_of_stock_products))
        .route(
            "/:id",
            get(get_product).patch(update_product).delete(delete_product),
        )
        .route("/:id/stock", post(change_stock))
        .route("/:id/ledger", get(product_ledger))
}

/// Check a payload-supplied category reference against the caller's tenant.
async fn check_category_ref(
    services: &AppServices,
    principal: &shoploom_auth::Principal,
    tenant_id: TenantId,
    category_id: Option<shoploom_core::CategoryId>,
) -> Result<(), axum::response::Response> {
    let Some(category_id) = category_id else {
        return Ok(());
    };
    match services.catalog.get_category(tenant_id, category_id).await {
        Ok(Some(category)) => tenancy::assert_same_tenant(principal, &category)
            .map_err(|e| errors::domain_error_to_response(&e)),
        Ok(None) => Err(errors::domain_error_to_response(&DomainError::validation(
            "unknown category",
        ))),
        Err(e) => Err(errors::store_error_to_response(e)),
    }
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<NewProduct>,
) -> axum::response::Response {
    let principal = principal.principal();
    let Some(tenant_id) = tenancy::tenant_of(Some(principal)) else {
        return errors::domain_error_to_response(&DomainError::NoTenant);
    };

    if let Err(response) = check_category_ref(&services, principal, tenant_id, body.category_id).await
    {
        return response;
    }

    let mut product = match Product::create(ProductId::new(), tenant_id, body, Utc::now()) {
        Ok(product) => product,
        Err(e) => return errors::domain_error_to_response(&e),
    };
    if let Err(e) = tenancy::stamp(principal, &mut product) {
        return errors::domain_error_to_response(&e);
    }

    match services.catalog.insert_product(product.clone()).await {
        Ok(()) => (StatusCode::CREATED, Json(dto::product_to_json(&product))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Query(query): Query<dto::ProductListQuery>,
) -> axum::response::Response {
    let Some(tenant_id) = tenancy::tenant_of(Some(principal.principal())) else {
        return (StatusCode::OK, Json(serde_json::json!({ "items": [] }))).into_response();
    };

    let filter = ProductFilter {
        category_id: query.category,
        min_price_cents: query.min_price,
        max_price_cents: query.max_price,
        in_stock: query.in_stock,
    };

    match services.catalog.list_products(tenant_id, &filter).await {
        Ok(products) => {
            let items: Vec<_> = products.iter().map(dto::product_to_json).collect();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn low_stock_products(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    let Some(tenant_id) = tenancy::tenant_of(Some(principal.principal())) else {
        return (StatusCode::OK, Json(serde_json::json!({ "items": [] }))).into_response();
    };

    match services.catalog.low_stock_products(tenant_id).await {
        Ok(products) => {
            let items: Vec<_> = products.iter().map(dto::product_to_json).collect();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn out_of_stock_products(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    let Some(tenant_id) = tenancy::tenant_of(Some(principal.principal())) else {
        return (StatusCode::OK, Json(serde_json::json!({ "items": [] }))).into_response();
    };

    match services.catalog.out_of_stock_products(tenant_id).await {
        Ok(products) => {
            let items: Vec<_> = products.iter().map(dto::product_to_json).collect();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let principal = principal.principal();
    let id: ProductId = match id.parse() {
        Ok(id) => id,
        Err(e) => return errors::domain_error_to_response(&e),
    };
    let Some(tenant_id) = tenancy::tenant_of(Some(principal)) else {
        return errors::json_error(StatusCode::NOT_FOUND, "not_found", "product not found");
    };

    match services.catalog.get_product(tenant_id, id).await {
        Ok(Some(product)) => {
            if let Err(e) = tenancy::assert_same_tenant(principal, &product) {
                return errors::domain_error_to_response(&e);
            }
            (StatusCode::OK, Json(dto::product_to_json(&product))).into_response()
        }
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "product not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(patch): Json<ProductPatch>,
) -> axum::response::Response {
    let principal = principal.principal();
    let id: ProductId = match id.parse() {
        Ok(id) => id,
        Err(e) => return errors::domain_error_to_response(&e),
    };
    let Some(tenant_id) = tenancy::tenant_of(Some(principal)) else {
        return errors::domain_error_to_response(&DomainError::NoTenant);
    };

    if let Some(Some(category_id)) = patch.category_id {
        if let Err(response) =
            check_category_ref(&services, principal, tenant_id, Some(category_id)).await
        {
            return response;
        }
    }

    let mut product = match services.catalog.get_product(tenant_id, id).await {
        Ok(Some(product)) => product,
        Ok(None) => {
            return errors::json_error(StatusCode::NOT_FOUND, "not_found", "product not found")
        }
        Err(e) => return errors::store_error_to_response(e),
    };
    if let Err(e) = tenancy::assert_same_tenant(principal, &product) {
        return errors::domain_error_to_response(&e);
    }

    if let Err(e) = product.apply_patch(patch, Utc::now()) {
        return errors::domain_error_to_response(&e);
    }

    match services.catalog.update_product(product.clone()).await {
        Ok(()) => (StatusCode::OK, Json(dto::product_to_json(&product))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let principal = principal.principal();
    if let Err(response) = authz::require_owner(principal) {
        return response;
    }

    let id: ProductId = match id.parse() {
        Ok(id) => id,
        Err(e) => return errors::domain_error_to_response(&e),
    };
    let Some(tenant_id) = tenancy::tenant_of(Some(principal)) else {
        return errors::domain_error_to_response(&DomainError::NoTenant);
    };

    match services.catalog.delete_product(tenant_id, id).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "product not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// The ledger operation: the only way stock moves.
pub async fn change_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::StockChangeRequest>,
) -> axum::response::Response {
    let principal = principal.principal();
    let id: ProductId = match id.parse() {
        Ok(id) => id,
        Err(e) => return errors::domain_error_to_response(&e),
    };
    let Some(tenant_id) = tenancy::tenant_of(Some(principal)) else {
        return errors::domain_error_to_response(&DomainError::NoTenant);
    };

    let change_type: ChangeType = match body.change_type.parse() {
        Ok(change_type) => change_type,
        Err(e) => return errors::domain_error_to_response(&e),
    };

    match services
        .inventory
        .apply_stock_change(
            tenant_id,
            id,
            change_type,
            body.quantity,
            principal.user_id,
            body.notes,
        )
        .await
    {
        Ok(outcome) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "previous_quantity": outcome.entry.before(),
                "new_quantity": outcome.entry.after(),
                "is_low_stock": outcome.product.is_low_stock(),
                "entry": dto::ledger_entry_to_json(&outcome.entry),
            })),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn product_ledger(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ProductId = match id.parse() {
        Ok(id) => id,
        Err(e) => return errors::domain_error_to_response(&e),
    };
    let Some(tenant_id) = tenancy::tenant_of(Some(principal.principal())) else {
        return (StatusCode::OK, Json(serde_json::json!({ "items": [] }))).into_response();
    };

    match services.inventory.ledger_for_product(tenant_id, id).await {
        Ok(entries) => {
            let items: Vec<_> = entries.iter().map(dto::ledger_entry_to_json).collect();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}
