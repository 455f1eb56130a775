use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;

use shoploom_core::{CustomerId, DomainError};
use shoploom_customers::{Customer, CustomerPatch, NewCustomer};
use shoploom_tenancy as tenancy;

use crate::app::{dto, errors, services::AppServices};
use crate::authz;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_customers).post(create_customer))
        .route("/recent", get(recent_customers))
        .route("/by_phone", get(find_by_phone))
        .route(
            "/:id",
            get(get_customer).patch(update_customer).delete(delete_customer),
        )
}

pub async fn create_customer(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<NewCustomer>,
) -> axum::response::Response {
    let principal = principal.principal();
    let Some(tenant_id) = tenancy::tenant_of(Some(principal)) else {
        return errors::domain_error_to_response(&DomainError::NoTenant);
    };

    let mut customer = match Customer::create(CustomerId::new(), tenant_id, body, Utc::now()) {
        Ok(customer) => customer,
        Err(e) => return errors::domain_error_to_response(&e),
    };
    // Tenant comes from the principal, never the payload.
    if let Err(e) = tenancy::stamp(principal, &mut customer) {
        return errors::domain_error_to_response(&e);
    }

    match services.customers.insert(customer.clone()).await {
        Ok(()) => {
            (StatusCode::CREATED, Json(dto::customer_to_json(&customer))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn list_customers(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    let Some(tenant_id) = tenancy::tenant_of(Some(principal.principal())) else {
        return (StatusCode::OK, Json(serde_json::json!({ "items": [] }))).into_response();
    };

    match services.customers.list(tenant_id).await {
        Ok(customers) => {
            let items: Vec<_> = customers.iter().map(dto::customer_to_json).collect();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

/// The 10 most recently added customers.
pub async fn recent_customers(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    let Some(tenant_id) = tenancy::tenant_of(Some(principal.principal())) else {
        return (StatusCode::OK, Json(serde_json::json!({ "items": [] }))).into_response();
    };

    match services.customers.list(tenant_id).await {
        Ok(customers) => {
            let items: Vec<_> = customers.iter().take(10).map(dto::customer_to_json).collect();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

/// Exact-phone lookup, for when a customer calls or walks in.
pub async fn find_by_phone(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Query(query): Query<dto::PhoneQuery>,
) -> axum::response::Response {
    let Some(phone) = query.phone.filter(|p| !p.is_empty()) else {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "phone number is required",
        );
    };

    let Some(tenant_id) = tenancy::tenant_of(Some(principal.principal())) else {
        return errors::json_error(StatusCode::NOT_FOUND, "not_found", "customer not found");
    };

    match services.customers.find_by_phone(tenant_id, &phone).await {
        Ok(Some(customer)) => {
            (StatusCode::OK, Json(dto::customer_to_json(&customer))).into_response()
        }
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "customer not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_customer(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let principal = principal.principal();
    let id: CustomerId = match id.parse() {
        Ok(id) => id,
        Err(e) => return errors::domain_error_to_response(&e),
    };
    let Some(tenant_id) = tenancy::tenant_of(Some(principal)) else {
        return errors::json_error(StatusCode::NOT_FOUND, "not_found", "customer not found");
    };

    match services.customers.get(tenant_id, id).await {
        Ok(Some(customer)) => {
            // Object-level check behind the tenant-keyed fetch.
            if let Err(e) = tenancy::assert_same_tenant(principal, &customer) {
                return errors::domain_error_to_response(&e);
            }
            (StatusCode::OK, Json(dto::customer_to_json(&customer))).into_response()
        }
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "customer not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_customer(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(patch): Json<CustomerPatch>,
) -> axum::response::Response {
    let principal = principal.principal();
    let id: CustomerId = match id.parse() {
        Ok(id) => id,
        Err(e) => return errors::domain_error_to_response(&e),
    };
    let Some(tenant_id) = tenancy::tenant_of(Some(principal)) else {
        return errors::domain_error_to_response(&DomainError::NoTenant);
    };

    let mut customer = match services.customers.get(tenant_id, id).await {
        Ok(Some(customer)) => customer,
        Ok(None) => {
            return errors::json_error(StatusCode::NOT_FOUND, "not_found", "customer not found")
        }
        Err(e) => return errors::store_error_to_response(e),
    };
    if let Err(e) = tenancy::assert_same_tenant(principal, &customer) {
        return errors::domain_error_to_response(&e);
    }

    if let Err(e) = customer.apply_patch(patch, Utc::now()) {
        return errors::domain_error_to_response(&e);
    }

    match services.customers.update(customer.clone()).await {
        Ok(()) => (StatusCode::OK, Json(dto::customer_to_json(&customer))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_customer(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let principal = principal.principal();
    if let Err(response) = authz::require_owner(principal) {
        return response;
    }

    let id: CustomerId = match id.parse() {
        Ok(id) => id,
        Err(e) => return errors::domain_error_to_response(&e),
    };
    let Some(tenant_id) = tenancy::tenant_of(Some(principal)) else {
        return errors::domain_error_to_response(&DomainError::NoTenant);
    };

    match services.customers.delete(tenant_id, id).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "customer not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}
