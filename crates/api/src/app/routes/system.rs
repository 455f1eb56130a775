use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use crate::context::{PrincipalContext, TenantContext};

pub async fn health() -> axum::response::Response {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" }))).into_response()
}

/// Echo the resolved request identity; handy for smoke tests and debugging
/// token wiring.
pub async fn whoami(
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    let p = principal.principal();
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "user_id": p.user_id.to_string(),
            "tenant_id": tenant.tenant_id().to_string(),
            "is_owner": p.is_owner,
            "is_staff": p.is_staff,
        })),
    )
        .into_response()
}
