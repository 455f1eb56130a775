use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use crate::app::{dto, errors, services::AppServices};

/// Global reference data: the industries open for registration. Public,
/// since callers need it before they have an account.
pub async fn list_industries(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.accounts.list_industries().await {
        Ok(industries) => {
            let items: Vec<_> = industries
                .iter()
                .filter(|i| i.is_active())
                .map(dto::industry_to_json)
                .collect();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}
