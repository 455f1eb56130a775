use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use shoploom_tenancy as tenancy;

use crate::app::{dto, errors, services::AppServices};
use crate::context::PrincipalContext;

/// The tenant's full inventory audit trail, newest first.
pub async fn list_ledger(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    let Some(tenant_id) = tenancy::tenant_of(Some(principal.principal())) else {
        return (StatusCode::OK, Json(serde_json::json!({ "items": [] }))).into_response();
    };

    match services.inventory.ledger(tenant_id).await {
        Ok(entries) => {
            let items: Vec<_> = entries.iter().map(dto::ledger_entry_to_json).collect();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}
