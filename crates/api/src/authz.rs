//! Role guards applied before store access.
//!
//! Any authenticated member of a business may read and write its data;
//! destructive operations are reserved for the owner.

use axum::http::StatusCode;

use shoploom_auth::Principal;

use crate::app::errors;

/// Restrict an operation to the business owner.
///
/// Returns the ready-made 403 response so handlers can `return` it directly.
pub fn require_owner(principal: &Principal) -> Result<(), axum::response::Response> {
    if principal.is_owner {
        Ok(())
    } else {
        Err(errors::json_error(
            StatusCode::FORBIDDEN,
            "forbidden",
            "only the business owner can perform this action",
        ))
    }
}
