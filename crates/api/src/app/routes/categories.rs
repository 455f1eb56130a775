use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;

use shoploom_catalog::Category;
use shoploom_core::{CategoryId, DomainError};
use shoploom_tenancy as tenancy;

use crate::app::{dto, errors, services::AppServices};
use crate::authz;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route(
            "/:id",
            get(get_category).patch(update_category).delete(delete_category),
        )
}

pub async fn create_category(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::CreateCategoryRequest>,
) -> axum::response::Response {
    let principal = principal.principal();
    let Some(tenant_id) = tenancy::tenant_of(Some(principal)) else {
        return errors::domain_error_to_response(&DomainError::NoTenant);
    };

    let mut category =
        match Category::create(CategoryId::new(), tenant_id, body.name, body.description, Utc::now())
        {
            Ok(category) => category,
            Err(e) => return errors::domain_error_to_response(&e),
        };
    if let Err(e) = tenancy::stamp(principal, &mut category) {
        return errors::domain_error_to_response(&e);
    }

    match services.catalog.insert_category(category.clone()).await {
        Ok(()) => (StatusCode::CREATED, Json(dto::category_to_json(&category))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn list_categories(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    let Some(tenant_id) = tenancy::tenant_of(Some(principal.principal())) else {
        return (StatusCode::OK, Json(serde_json::json!({ "items": [] }))).into_response();
    };

    match services.catalog.list_categories(tenant_id).await {
        Ok(categories) => {
            let items: Vec<_> = categories.iter().map(dto::category_to_json).collect();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_category(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let principal = principal.principal();
    let id: CategoryId = match id.parse() {
        Ok(id) => id,
        Err(e) => return errors::domain_error_to_response(&e),
    };
    let Some(tenant_id) = tenancy::tenant_of(Some(principal)) else {
        return errors::json_error(StatusCode::NOT_FOUND, "not_found", "category not found");
    };

    match services.catalog.get_category(tenant_id, id).await {
        Ok(Some(category)) => {
            if let Err(e) = tenancy::assert_same_tenant(principal, &category) {
                return errors::domain_error_to_response(&e);
            }
            (StatusCode::OK, Json(dto::category_to_json(&category))).into_response()
        }
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "category not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_category(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateCategoryRequest>,
) -> axum::response::Response {
    let principal = principal.principal();
    let id: CategoryId = match id.parse() {
        Ok(id) => id,
        Err(e) => return errors::domain_error_to_response(&e),
    };
    let Some(tenant_id) = tenancy::tenant_of(Some(principal)) else {
        return errors::domain_error_to_response(&DomainError::NoTenant);
    };

    let mut category = match services.catalog.get_category(tenant_id, id).await {
        Ok(Some(category)) => category,
        Ok(None) => {
            return errors::json_error(StatusCode::NOT_FOUND, "not_found", "category not found")
        }
        Err(e) => return errors::store_error_to_response(e),
    };
    if let Err(e) = tenancy::assert_same_tenant(principal, &category) {
        return errors::domain_error_to_response(&e);
    }

    let now = Utc::now();
    if let Some(name) = body.name {
        if let Err(e) = category.rename(name, now) {
            return errors::domain_error_to_response(&e);
        }
    }
    if let Some(description) = body.description {
        category.set_description(description, now);
    }

    match services.catalog.update_category(category.clone()).await {
        Ok(()) => (StatusCode::OK, Json(dto::category_to_json(&category))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_category(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let principal = principal.principal();
    if let Err(response) = authz::require_owner(principal) {
        return response;
    }

    let id: CategoryId = match id.parse() {
        Ok(id) => id,
        Err(e) => return errors::domain_error_to_response(&e),
    };
    let Some(tenant_id) = tenancy::tenant_of(Some(principal)) else {
        return errors::domain_error_to_response(&DomainError::NoTenant);
    };

    match services.catalog.delete_category(tenant_id, id).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "category not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}
