use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use shoploom_core::DomainError;
use shoploom_infra::StoreError;

/// Map a domain error onto a JSON error response with a stable code.
pub fn domain_error_to_response(err: &DomainError) -> axum::response::Response {
    match err {
        DomainError::Unauthenticated => {
            json_error(StatusCode::UNAUTHORIZED, "unauthenticated", err.to_string())
        }
        DomainError::NoTenant => json_error(StatusCode::FORBIDDEN, "no_tenant", err.to_string()),
        DomainError::CrossTenantReference => {
            json_error(StatusCode::FORBIDDEN, "cross_tenant_reference", err.to_string())
        }
        DomainError::InsufficientStock { .. } => {
            json_error(StatusCode::CONFLICT, "insufficient_stock", err.to_string())
        }
        DomainError::InvalidStatus(_) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_status", err.to_string())
        }
        DomainError::InvalidChangeType(_) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_change_type", err.to_string())
        }
        DomainError::InvalidQuantity(_) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_quantity", err.to_string())
        }
        DomainError::Validation(_) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", err.to_string())
        }
        DomainError::InvalidId(_) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_id", err.to_string())
        }
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        DomainError::Conflict(_) => json_error(StatusCode::CONFLICT, "conflict", err.to_string()),
        DomainError::Forbidden => json_error(StatusCode::FORBIDDEN, "forbidden", err.to_string()),
    }
}

/// Map a store error onto a response. Backend failures are logged and
/// surfaced as an opaque 500; domain failures keep their precise mapping.
pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    match err {
        StoreError::Domain(domain) => domain_error_to_response(&domain),
        StoreError::Backend { operation, message } => {
            tracing::error!(operation, %message, "store backend failure");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "storage_error",
                "storage backend failure",
            )
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
