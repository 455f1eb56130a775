use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;

use shoploom_core::{CustomerId, DomainError, MeasurementId};
use shoploom_tailoring::{Measurement, NewMeasurement};
use shoploom_tenancy as tenancy;

use crate::app::{dto, errors, services::AppServices};
use crate::authz;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_measurements).post(create_measurement))
        .route("/by_customer/:customer_id", get(measurements_by_customer))
        .route(
            "/:id",
            get(get_measurement)
                .patch(update_measurement)
                .delete(delete_measurement),
        )
}

pub async fn create_measurement(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<NewMeasurement>,
) -> axum::response::Response {
    let principal = principal.principal();
    let Some(tenant_id) = tenancy::tenant_of(Some(principal)) else {
        return errors::domain_error_to_response(&DomainError::NoTenant);
    };

    // The referenced customer must exist and belong to the caller's tenant.
    match services.customers.get(tenant_id, body.customer_id).await {
        Ok(Some(customer)) => {
            if let Err(e) = tenancy::assert_same_tenant(principal, &customer) {
                return errors::domain_error_to_response(&e);
            }
        }
        Ok(None) => {
            return errors::json_error(StatusCode::NOT_FOUND, "not_found", "customer not found")
        }
        Err(e) => return errors::store_error_to_response(e),
    }

    let mut measurement =
        match Measurement::create(MeasurementId::new(), tenant_id, body, Utc::now()) {
            Ok(measurement) => measurement,
            Err(e) => return errors::domain_error_to_response(&e),
        };
    if let Err(e) = tenancy::stamp(principal, &mut measurement) {
        return errors::domain_error_to_response(&e);
    }

    match services.tailoring.insert_measurement(measurement.clone()).await {
        Ok(()) => {
            (StatusCode::CREATED, Json(dto::measurement_to_json(&measurement))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn list_measurements(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    let Some(tenant_id) = tenancy::tenant_of(Some(principal.principal())) else {
        return (StatusCode::OK, Json(serde_json::json!({ "items": [] }))).into_response();
    };

    match services.tailoring.list_measurements(tenant_id).await {
        Ok(measurements) => {
            let items: Vec<_> = measurements.iter().map(dto::measurement_to_json).collect();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn measurements_by_customer(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(customer_id): Path<String>,
) -> axum::response::Response {
    let customer_id: CustomerId = match customer_id.parse() {
        Ok(id) => id,
        Err(e) => return errors::domain_error_to_response(&e),
    };
    let Some(tenant_id) = tenancy::tenant_of(Some(principal.principal())) else {
        return (StatusCode::OK, Json(serde_json::json!({ "items": [] }))).into_response();
    };

    match services
        .tailoring
        .measurements_for_customer(tenant_id, customer_id)
        .await
    {
        Ok(measurements) => {
            let items: Vec<_> = measurements.iter().map(dto::measurement_to_json).collect();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_measurement(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let principal = principal.principal();
    let id: MeasurementId = match id.parse() {
        Ok(id) => id,
        Err(e) => return errors::domain_error_to_response(&e),
    };
    let Some(tenant_id) = tenancy::tenant_of(Some(principal)) else {
        return errors::json_error(StatusCode::NOT_FOUND, "not_found", "measurement not found");
    };

    match services.tailoring.get_measurement(tenant_id, id).await {
        Ok(Some(measurement)) => {
            if let Err(e) = tenancy::assert_same_tenant(principal, &measurement) {
                return errors::domain_error_to_response(&e);
            }
            (StatusCode::OK, Json(dto::measurement_to_json(&measurement))).into_response()
        }
        Ok(None) => {
            errors::json_error(StatusCode::NOT_FOUND, "not_found", "measurement not found")
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

#[derive(Debug, serde::Deserialize)]
pub struct UpdateMeasurementRequest {
    pub dimensions: Option<shoploom_tailoring::Dimensions>,
    pub date_taken: Option<chrono::NaiveDate>,
    pub notes: Option<String>,
}

pub async fn update_measurement(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<UpdateMeasurementRequest>,
) -> axum::response::Response {
    let principal = principal.principal();
    let id: MeasurementId = match id.parse() {
        Ok(id) => id,
        Err(e) => return errors::domain_error_to_response(&e),
    };
    let Some(tenant_id) = tenancy::tenant_of(Some(principal)) else {
        return errors::domain_error_to_response(&DomainError::NoTenant);
    };

    let mut measurement = match services.tailoring.get_measurement(tenant_id, id).await {
        Ok(Some(measurement)) => measurement,
        Ok(None) => {
            return errors::json_error(StatusCode::NOT_FOUND, "not_found", "measurement not found")
        }
        Err(e) => return errors::store_error_to_response(e),
    };
    if let Err(e) = tenancy::assert_same_tenant(principal, &measurement) {
        return errors::domain_error_to_response(&e);
    }

    let now = Utc::now();
    if body.dimensions.is_some() || body.date_taken.is_some() {
        let dimensions = body.dimensions.unwrap_or(*measurement.dimensions());
        let date_taken = body.date_taken.unwrap_or_else(|| measurement.date_taken());
        if let Err(e) = measurement.update_dimensions(dimensions, date_taken, now) {
            return errors::domain_error_to_response(&e);
        }
    }
    if let Some(notes) = body.notes {
        measurement.set_notes(notes, now);
    }

    match services.tailoring.update_measurement(measurement.clone()).await {
        Ok(()) => (StatusCode::OK, Json(dto::measurement_to_json(&measurement))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_measurement(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let principal = principal.principal();
    if let Err(response) = authz::require_owner(principal) {
        return response;
    }

    let id: MeasurementId = match id.parse() {
        Ok(id) => id,
        Err(e) => return errors::domain_error_to_response(&e),
    };
    let Some(tenant_id) = tenancy::tenant_of(Some(principal)) else {
        return errors::domain_error_to_response(&DomainError::NoTenant);
    };

    match services.tailoring.delete_measurement(tenant_id, id).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => {
            errors::json_error(StatusCode::NOT_FOUND, "not_found", "measurement not found")
        }
        Err(e) => errors::store_error_to_response(e),
    }
}
