use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;

use shoploom_accounts::{Business, User};
use shoploom_core::{DomainError, Entity, TenantId, UserId};

use crate::app::{dto, errors, services::AppServices};
use crate::context::TenantContext;

/// Onboard a new business with its owner.
///
/// Public: this is the front door. Creates the business row and the owner's
/// user record, linked both ways. Credentials and tokens are the identity
/// provider's business; the response carries ids only.
pub async fn register_business(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::RegisterBusinessRequest>,
) -> axum::response::Response {
    let industry = match services.accounts.get_industry(body.industry_id).await {
        Ok(Some(industry)) => industry,
        Ok(None) => {
            return errors::domain_error_to_response(&DomainError::validation(
                "unknown industry",
            ))
        }
        Err(e) => return errors::store_error_to_response(e),
    };

    let now = Utc::now();

    let mut owner = match User::new(
        UserId::new(),
        body.owner.email,
        body.owner.username,
        body.owner.phone,
        now,
    ) {
        Ok(user) => user,
        Err(e) => return errors::domain_error_to_response(&e),
    };

    let mut business = match Business::register(
        TenantId::new(),
        body.store_name,
        body.email,
        body.phone,
        body.country,
        &industry,
        now,
    ) {
        Ok(business) => business,
        Err(e) => return errors::domain_error_to_response(&e),
    };

    if let Err(e) = business.assign_owner(*owner.id(), now) {
        return errors::domain_error_to_response(&e);
    }
    if let Err(e) = owner.attach_as_owner(*business.id()) {
        return errors::domain_error_to_response(&e);
    }

    if let Err(e) = services.accounts.insert_business(business.clone()).await {
        return errors::store_error_to_response(e);
    }
    if let Err(e) = services.accounts.insert_user(owner.clone()).await {
        return errors::store_error_to_response(e);
    }

    tracing::info!(business_id = %business.id(), "business registered");

    (
        StatusCode::CREATED,
        Json(serde_json::json!({
            "business": dto::business_to_json(&business),
            "owner": dto::user_to_json(&owner),
        })),
    )
        .into_response()
}

/// The calling principal's own business details.
pub async fn get_business(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
) -> axum::response::Response {
    match services.accounts.get_business(tenant.tenant_id()).await {
        Ok(Some(business)) => {
            (StatusCode::OK, Json(dto::business_to_json(&business))).into_response()
        }
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "business not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}
