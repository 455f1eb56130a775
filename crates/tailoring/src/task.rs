use core::str::FromStr;

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use shoploom_core::{
    CustomerId, DomainError, DomainResult, Entity, MeasurementId, TaskId, TenantId,
};
use shoploom_tenancy::{TenantScoped, TenantStamped};

use crate::GarmentType;

/// Workflow position of a tailoring task.
///
/// Transitions are deliberately unordered: any status may be set to any
/// other (the shop corrects mistakes by moving a task backwards). Ordering
/// rules, if ever wanted, belong in a future revision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    #[default]
    NotStarted,
    InProgress,
    ReadyForFitting,
    Completed,
    Delivered,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 5] = [
        TaskStatus::NotStarted,
        TaskStatus::InProgress,
        TaskStatus::ReadyForFitting,
        TaskStatus::Completed,
        TaskStatus::Delivered,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::NotStarted => "NOT_STARTED",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::ReadyForFitting => "READY_FOR_FITTING",
            TaskStatus::Completed => "COMPLETED",
            TaskStatus::Delivered => "DELIVERED",
        }
    }

    /// Whether the work is finished (the garment is done or handed over).
    pub fn is_closed(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Delivered)
    }
}

impl core::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NOT_STARTED" => Ok(TaskStatus::NotStarted),
            "IN_PROGRESS" => Ok(TaskStatus::InProgress),
            "READY_FOR_FITTING" => Ok(TaskStatus::ReadyForFitting),
            "COMPLETED" => Ok(TaskStatus::Completed),
            "DELIVERED" => Ok(TaskStatus::Delivered),
            other => Err(DomainError::InvalidStatus(other.to_string())),
        }
    }
}

/// Creation payload for a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    pub customer_id: CustomerId,
    pub measurement_id: Option<MeasurementId>,
    pub garment_type: GarmentType,
    #[serde(default)]
    pub description: String,
    pub due_date: NaiveDate,
    pub price_cents: Option<i64>,
}

/// Partial update for a task. Status moves through [`Task::set_status`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPatch {
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub price_cents: Option<Option<i64>>,
    pub paid: Option<bool>,
    pub measurement_id: Option<Option<MeasurementId>>,
}

/// A tailoring order tracked from intake to delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    tenant_id: TenantId,
    customer_id: CustomerId,
    measurement_id: Option<MeasurementId>,
    garment_type: GarmentType,
    description: String,
    due_date: NaiveDate,
    status: TaskStatus,
    price_cents: Option<i64>,
    paid: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Task {
    pub fn create(
        id: TaskId,
        tenant_id: TenantId,
        new: NewTask,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if let Some(price) = new.price_cents {
            if price < 0 {
                return Err(DomainError::validation("price cannot be negative"));
            }
        }

        Ok(Self {
            id,
            tenant_id,
            customer_id: new.customer_id,
            measurement_id: new.measurement_id,
            garment_type: new.garment_type,
            description: new.description,
            due_date: new.due_date,
            status: TaskStatus::default(),
            price_cents: new.price_cents,
            paid: false,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    pub fn measurement_id(&self) -> Option<MeasurementId> {
        self.measurement_id
    }

    pub fn garment_type(&self) -> GarmentType {
        self.garment_type
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn due_date(&self) -> NaiveDate {
        self.due_date
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn price_cents(&self) -> Option<i64> {
        self.price_cents
    }

    pub fn paid(&self) -> bool {
        self.paid
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Move the task to `status`. Any enumerated status is accepted, in any
    /// order; unrecognized labels are rejected upstream when parsing.
    pub fn set_status(&mut self, status: TaskStatus, now: DateTime<Utc>) {
        self.status = status;
        self.updated_at = now;
    }

    /// Past due and still open.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.status.is_closed() && self.due_date < today
    }

    /// Due within the next three days (or already past).
    pub fn is_due_soon(&self, today: NaiveDate) -> bool {
        self.due_date <= today + Days::new(3)
    }

    pub fn apply_patch(&mut self, patch: TaskPatch, now: DateTime<Utc>) -> DomainResult<()> {
        if let Some(price_cents) = patch.price_cents {
            if let Some(price) = price_cents {
                if price < 0 {
                    return Err(DomainError::validation("price cannot be negative"));
                }
            }
            self.price_cents = price_cents;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = due_date;
        }
        if let Some(paid) = patch.paid {
            self.paid = paid;
        }
        if let Some(measurement_id) = patch.measurement_id {
            self.measurement_id = measurement_id;
        }
        self.updated_at = now;
        Ok(())
    }
}

impl Entity for Task {
    type Id = TaskId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl TenantScoped for Task {
    fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }
}

impl TenantStamped for Task {
    fn set_tenant_id(&mut self, tenant_id: TenantId) {
        self.tenant_id = tenant_id;
    }
}
