use serde::Deserialize;

use shoploom_accounts::{Business, Industry, User};
use shoploom_catalog::{Category, Product};
use shoploom_core::{CategoryId, CustomerId, Entity, IndustryId};
use shoploom_customers::Customer;
use shoploom_inventory::LedgerEntry;
use shoploom_tailoring::{GarmentType, Measurement, Task};

// -------------------------
// Request DTOs
// -------------------------
//
// Creation/patch payloads for customers, products, measurements and tasks
// deserialize straight into the domain's `New*`/`*Patch` structs; only the
// requests that need extra shape (string-typed enums to parse, nested owner
// data) get a DTO here. None of them carry a tenant: that always comes
// from the token.

#[derive(Debug, Deserialize)]
pub struct RegisterOwnerRequest {
    pub email: String,
    pub username: String,
    #[serde(default)]
    pub phone: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterBusinessRequest {
    pub store_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub country: String,
    pub industry_id: IndustryId,
    pub owner: RegisterOwnerRequest,
}

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Stock-change request. `change_type` stays a string so unknown labels get
/// the precise `invalid_change_type` rejection rather than a generic
/// deserialization error.
#[derive(Debug, Deserialize)]
pub struct StockChangeRequest {
    pub change_type: String,
    pub quantity: i64,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Deserialize)]
pub struct SetTaskStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct ProductListQuery {
    pub category: Option<CategoryId>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub in_stock: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct PhoneQuery {
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TaskListQuery {
    pub status: Option<String>,
    pub garment_type: Option<GarmentType>,
    pub customer: Option<CustomerId>,
    pub paid: Option<bool>,
}

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn industry_to_json(industry: &Industry) -> serde_json::Value {
    serde_json::json!({
        "id": industry.id().to_string(),
        "name": industry.name(),
        "description": industry.description(),
        "is_active": industry.is_active(),
    })
}

pub fn business_to_json(business: &Business) -> serde_json::Value {
    serde_json::json!({
        "id": business.id().to_string(),
        "store_name": business.store_name(),
        "email": business.email(),
        "phone": business.phone(),
        "country": business.country(),
        "industry_id": business.industry_id().to_string(),
        "owner": business.owner().map(|o| o.to_string()),
        "is_active": business.is_active(),
        "created_at": business.created_at().to_rfc3339(),
    })
}

pub fn user_to_json(user: &User) -> serde_json::Value {
    serde_json::json!({
        "id": user.id().to_string(),
        "email": user.email(),
        "username": user.username(),
        "phone": user.phone(),
        "business_id": user.business_id().map(|b| b.to_string()),
        "is_business_owner": user.is_business_owner(),
        "is_staff_member": user.is_staff_member(),
    })
}

pub fn customer_to_json(customer: &Customer) -> serde_json::Value {
    serde_json::json!({
        "id": customer.id().to_string(),
        "name": customer.name(),
        "phone": customer.phone(),
        "email": customer.email(),
        "address": customer.address(),
        "notes": customer.notes(),
        "created_at": customer.created_at().to_rfc3339(),
        "updated_at": customer.updated_at().to_rfc3339(),
    })
}

pub fn category_to_json(category: &Category) -> serde_json::Value {
    serde_json::json!({
        "id": category.id().to_string(),
        "name": category.name(),
        "description": category.description(),
        "created_at": category.created_at().to_rfc3339(),
    })
}

pub fn product_to_json(product: &Product) -> serde_json::Value {
    serde_json::json!({
        "id": product.id().to_string(),
        "name": product.name(),
        "description": product.description(),
        "category_id": product.category_id().map(|c| c.to_string()),
        "price_cents": product.price_cents(),
        "quantity": product.quantity(),
        "low_stock_threshold": product.low_stock_threshold(),
        "sku": product.sku(),
        "is_low_stock": product.is_low_stock(),
        "is_out_of_stock": product.is_out_of_stock(),
        "created_at": product.created_at().to_rfc3339(),
    })
}

pub fn ledger_entry_to_json(entry: &LedgerEntry) -> serde_json::Value {
    serde_json::json!({
        "id": entry.id().to_string(),
        "product_id": entry.product_id().to_string(),
        "actor": entry.actor().to_string(),
        "change_type": entry.change_type().as_str(),
        "delta": entry.delta(),
        "before": entry.before(),
        "after": entry.after(),
        "notes": entry.notes(),
        "occurred_at": entry.occurred_at().to_rfc3339(),
    })
}

pub fn measurement_to_json(measurement: &Measurement) -> serde_json::Value {
    serde_json::json!({
        "id": measurement.id().to_string(),
        "customer_id": measurement.customer_id().to_string(),
        "garment_type": measurement.garment_type(),
        "dimensions": measurement.dimensions(),
        "notes": measurement.notes(),
        "date_taken": measurement.date_taken(),
        "created_at": measurement.created_at().to_rfc3339(),
    })
}

pub fn task_to_json(task: &Task) -> serde_json::Value {
    serde_json::json!({
        "id": task.id().to_string(),
        "customer_id": task.customer_id().to_string(),
        "measurement_id": task.measurement_id().map(|m| m.to_string()),
        "garment_type": task.garment_type(),
        "description": task.description(),
        "due_date": task.due_date(),
        "status": task.status().as_str(),
        "price_cents": task.price_cents(),
        "paid": task.paid(),
        "created_at": task.created_at().to_rfc3339(),
    })
}
