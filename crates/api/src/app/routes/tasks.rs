use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;

use shoploom_core::{DomainError, TaskId};
use shoploom_tailoring::{NewTask, Task, TaskPatch, TaskStatus};
use shoploom_tenancy as tenancy;

use crate::app::{dto, errors, services::AppServices};
use crate::authz;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_tasks).post(create_task))
        .route("/today", get(tasks_due_today))
        .route("/overdue", get(overdue_tasks))
        .route("/upcoming", get(upcoming_tasks))
        .route("/:id", get(get_task).patch(update_task).delete(delete_task))
        .route("/:id/status", post(set_task_status))
}

pub async fn create_task(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<NewTask>,
) -> axum::response::Response {
    let principal = principal.principal();
    let Some(tenant_id) = tenancy::tenant_of(Some(principal)) else {
        return errors::domain_error_to_response(&DomainError::NoTenant);
    };

    // Referenced entities must belong to the caller's tenant.
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
    if let Some(measurement_id) = body.measurement_id {
        match services.tailoring.get_measurement(tenant_id, measurement_id).await {
            Ok(Some(measurement)) => {
                if let Err(e) = tenancy::assert_same_tenant(principal, &measurement) {
                    return errors::domain_error_to_response(&e);
                }
            }
            Ok(None) => {
                return errors::json_error(
                    StatusCode::NOT_FOUND,
                    "not_found",
                    "measurement not found",
                )
            }
            Err(e) => return errors::store_error_to_response(e),
        }
    }

    let mut task = match Task::create(TaskId::new(), tenant_id, body, Utc::now()) {
        Ok(task) => task,
        Err(e) => return errors::domain_error_to_response(&e),
    };
    if let Err(e) = tenancy::stamp(principal, &mut task) {
        return errors::domain_error_to_response(&e);
    }

    match services.tailoring.insert_task(task.clone()).await {
        Ok(()) => (StatusCode::CREATED, Json(dto::task_to_json(&task))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

async fn filtered_tasks(
    services: &AppServices,
    principal: &PrincipalContext,
    query: dto::TaskListQuery,
) -> Result<Vec<Task>, axum::response::Response> {
    let Some(tenant_id) = tenancy::tenant_of(Some(principal.principal())) else {
        return Ok(Vec::new());
    };

    let status = match query.status.as_deref() {
        Some(s) => Some(
            s.parse::<TaskStatus>()
                .map_err(|e| errors::domain_error_to_response(&e))?,
        ),
        None => None,
    };

    let tasks = services
        .tailoring
        .list_tasks(tenant_id)
        .await
        .map_err(errors::store_error_to_response)?;

    Ok(tasks
        .into_iter()
        .filter(|t| status.map_or(true, |s| t.status() == s))
        .filter(|t| query.garment_type.map_or(true, |g| t.garment_type() == g))
        .filter(|t| query.customer.map_or(true, |c| t.customer_id() == c))
        .filter(|t| query.paid.map_or(true, |p| t.paid() == p))
        .collect())
}

fn tasks_response(tasks: Vec<Task>) -> axum::response::Response {
    let items: Vec<_> = tasks.iter().map(dto::task_to_json).collect();
    (
        StatusCode::OK,
        Json(serde_json::json!({ "count": items.len(), "items": items })),
    )
        .into_response()
}

pub async fn list_tasks(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Query(query): Query<dto::TaskListQuery>,
) -> axum::response::Response {
    match filtered_tasks(&services, &principal, query).await {
        Ok(tasks) => tasks_response(tasks),
        Err(response) => response,
    }
}

/// Open tasks due today.
pub async fn tasks_due_today(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    let today = Utc::now().date_naive();
    match filtered_tasks(&services, &principal, default_query()).await {
        Ok(tasks) => tasks_response(
            tasks
                .into_iter()
                .filter(|t| t.due_date() == today && !t.status().is_closed())
                .collect(),
        ),
        Err(response) => response,
    }
}

/// Open tasks past their due date.
pub async fn overdue_tasks(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    let today = Utc::now().date_naive();
    match filtered_tasks(&services, &principal, default_query()).await {
        Ok(tasks) => tasks_response(tasks.into_iter().filter(|t| t.is_overdue(today)).collect()),
        Err(response) => response,
    }
}

/// Open tasks due within the next 7 days.
pub async fn upcoming_tasks(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    let today = Utc::now().date_naive();
    let horizon = today + chrono::Days::new(7);
    match filtered_tasks(&services, &principal, default_query()).await {
        Ok(tasks) => tasks_response(
            tasks
                .into_iter()
                .filter(|t| {
                    t.due_date() >= today && t.due_date() <= horizon && !t.status().is_closed()
                })
                .collect(),
        ),
        Err(response) => response,
    }
}

fn default_query() -> dto::TaskListQuery {
    dto::TaskListQuery {
        status: None,
        garment_type: None,
        customer: None,
        paid: None,
    }
}

pub async fn get_task(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let principal = principal.principal();
    let id: TaskId = match id.parse() {
        Ok(id) => id,
        Err(e) => return errors::domain_error_to_response(&e),
    };
    let Some(tenant_id) = tenancy::tenant_of(Some(principal)) else {
        return errors::json_error(StatusCode::NOT_FOUND, "not_found", "task not found");
    };

    match services.tailoring.get_task(tenant_id, id).await {
        Ok(Some(task)) => {
            if let Err(e) = tenancy::assert_same_tenant(principal, &task) {
                return errors::domain_error_to_response(&e);
            }
            (StatusCode::OK, Json(dto::task_to_json(&task))).into_response()
        }
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "task not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_task(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(patch): Json<TaskPatch>,
) -> axum::response::Response {
    let principal = principal.principal();
    let id: TaskId = match id.parse() {
        Ok(id) => id,
        Err(e) => return errors::domain_error_to_response(&e),
    };
    let Some(tenant_id) = tenancy::tenant_of(Some(principal)) else {
        return errors::domain_error_to_response(&DomainError::NoTenant);
    };

    let mut task = match services.tailoring.get_task(tenant_id, id).await {
        Ok(Some(task)) => task,
        Ok(None) => {
            return errors::json_error(StatusCode::NOT_FOUND, "not_found", "task not found")
        }
        Err(e) => return errors::store_error_to_response(e),
    };
    if let Err(e) = tenancy::assert_same_tenant(principal, &task) {
        return errors::domain_error_to_response(&e);
    }

    if let Some(Some(measurement_id)) = patch.measurement_id {
        match services.tailoring.get_measurement(tenant_id, measurement_id).await {
            Ok(Some(measurement)) => {
                if let Err(e) = tenancy::assert_same_tenant(principal, &measurement) {
                    return errors::domain_error_to_response(&e);
                }
            }
            Ok(None) => {
                return errors::json_error(
                    StatusCode::NOT_FOUND,
                    "not_found",
                    "measurement not found",
                )
            }
            Err(e) => return errors::store_error_to_response(e),
        }
    }

    if let Err(e) = task.apply_patch(patch, Utc::now()) {
        return errors::domain_error_to_response(&e);
    }

    match services.tailoring.update_task(task.clone()).await {
        Ok(()) => (StatusCode::OK, Json(dto::task_to_json(&task))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// Move a task to a new status. Any enumerated status is accepted in any
/// order; unknown labels get `invalid_status`.
pub async fn set_task_status(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::SetTaskStatusRequest>,
) -> axum::response::Response {
    let principal = principal.principal();
    let id: TaskId = match id.parse() {
        Ok(id) => id,
        Err(e) => return errors::domain_error_to_response(&e),
    };
    let Some(tenant_id) = tenancy::tenant_of(Some(principal)) else {
        return errors::domain_error_to_response(&DomainError::NoTenant);
    };

    let status: TaskStatus = match body.status.parse() {
        Ok(status) => status,
        Err(e) => return errors::domain_error_to_response(&e),
    };

    let mut task = match services.tailoring.get_task(tenant_id, id).await {
        Ok(Some(task)) => task,
        Ok(None) => {
            return errors::json_error(StatusCode::NOT_FOUND, "not_found", "task not found")
        }
        Err(e) => return errors::store_error_to_response(e),
    };
    if let Err(e) = tenancy::assert_same_tenant(principal, &task) {
        return errors::domain_error_to_response(&e);
    }

    task.set_status(status, Utc::now());

    match services.tailoring.update_task(task.clone()).await {
        Ok(()) => (StatusCode::OK, Json(dto::task_to_json(&task))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_task(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let principal = principal.principal();
    if let Err(response) = authz::require_owner(principal) {
        return response;
    }

    let id: TaskId = match id.parse() {
        Ok(id) => id,
        Err(e) => return errors::domain_error_to_response(&e),
    };
    let Some(tenant_id) = tenancy::tenant_of(Some(principal)) else {
        return errors::domain_error_to_response(&DomainError::NoTenant);
    };

    match services.tailoring.delete_task(tenant_id, id).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "task not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}
