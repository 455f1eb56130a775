//! Tenant-isolated storage abstractions.
//!
//! Every read takes the tenant to confine the query to; every write takes
//! entities already stamped by the tenancy layer. Implementations must make
//! cross-tenant access impossible at the storage level too (tenant in every
//! key / WHERE clause), as defense in depth behind the tenancy functions.

pub mod in_memory;
pub mod postgres;

use async_trait::async_trait;

use shoploom_accounts::{Business, Industry, User};
use shoploom_catalog::{Category, Product, ProductFilter};
use shoploom_core::{
    CategoryId, CustomerId, IndustryId, MeasurementId, ProductId, TaskId, TenantId, UserId,
};
use shoploom_customers::Customer;
use shoploom_inventory::{ChangeType, LedgerEntry};
use shoploom_tailoring::{Measurement, Task};

use crate::StoreResult;

pub use in_memory::InMemoryStore;
pub use postgres::PostgresStore;

/// Businesses, users and industry reference data.
///
/// Businesses and users are keyed by their own ids (a business *is* the
/// tenant); industries are global.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn insert_industry(&self, industry: Industry) -> StoreResult<()>;
    async fn get_industry(&self, id: IndustryId) -> StoreResult<Option<Industry>>;
    async fn list_industries(&self) -> StoreResult<Vec<Industry>>;

    /// Insert a new business. Emails are unique across all businesses.
    async fn insert_business(&self, business: Business) -> StoreResult<()>;
    async fn get_business(&self, id: TenantId) -> StoreResult<Option<Business>>;
    async fn update_business(&self, business: Business) -> StoreResult<()>;

    /// Insert a new user. Emails are unique across all users.
    async fn insert_user(&self, user: User) -> StoreResult<()>;
    async fn get_user(&self, id: UserId) -> StoreResult<Option<User>>;
    async fn update_user(&self, user: User) -> StoreResult<()>;
}

/// Customer records, confined to one tenant per call.
#[async_trait]
pub trait CustomerStore: Send + Sync {
    /// Insert a customer. Phone numbers are unique within the tenant.
    async fn insert(&self, customer: Customer) -> StoreResult<()>;
    async fn get(&self, tenant_id: TenantId, id: CustomerId) -> StoreResult<Option<Customer>>;
    /// All customers of the tenant, newest first.
    async fn list(&self, tenant_id: TenantId) -> StoreResult<Vec<Customer>>;
    async fn update(&self, customer: Customer) -> StoreResult<()>;
    /// Returns `true` when a row was removed.
    async fn delete(&self, tenant_id: TenantId, id: CustomerId) -> StoreResult<bool>;
    async fn find_by_phone(
        &self,
        tenant_id: TenantId,
        phone: &str,
    ) -> StoreResult<Option<Customer>>;
}

/// Categories and products.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Insert a category. Names are unique within the tenant.
    async fn insert_category(&self, category: Category) -> StoreResult<()>;
    async fn get_category(
        &self,
        tenant_id: TenantId,
        id: CategoryId,
    ) -> StoreResult<Option<Category>>;
    async fn list_categories(&self, tenant_id: TenantId) -> StoreResult<Vec<Category>>;
    async fn update_category(&self, category: Category) -> StoreResult<()>;
    async fn delete_category(&self, tenant_id: TenantId, id: CategoryId) -> StoreResult<bool>;

    async fn insert_product(&self, product: Product) -> StoreResult<()>;
    async fn get_product(&self, tenant_id: TenantId, id: ProductId)
        -> StoreResult<Option<Product>>;
    /// Products of the tenant matching `filter`, newest first.
    async fn list_products(
        &self,
        tenant_id: TenantId,
        filter: &ProductFilter,
    ) -> StoreResult<Vec<Product>>;
    /// Update everything except `quantity`, which only moves through
    /// [`InventoryStore::apply_stock_change`].
    async fn update_product(&self, product: Product) -> StoreResult<()>;
    async fn delete_product(&self, tenant_id: TenantId, id: ProductId) -> StoreResult<bool>;

    async fn low_stock_products(&self, tenant_id: TenantId) -> StoreResult<Vec<Product>>;
    async fn out_of_stock_products(&self, tenant_id: TenantId) -> StoreResult<Vec<Product>>;
}

/// Outcome of an accepted, persisted stock change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockOutcome {
    pub product: Product,
    pub entry: LedgerEntry,
}

/// The stock ledger: the one transactional path in the system.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Apply a stock change to a product and append its ledger entry as a
    /// single indivisible unit.
    ///
    /// Implementations must serialize concurrent calls against the same
    /// product (lock or equivalent) so the read-modify-write of `quantity`
    /// plus the entry insert loses no updates. A rejected change (domain
    /// error) persists nothing.
    async fn apply_stock_change(
        &self,
        tenant_id: TenantId,
        product_id: ProductId,
        change_type: ChangeType,
        quantity: i64,
        actor: UserId,
        notes: String,
    ) -> StoreResult<StockOutcome>;

    /// Ledger entries for one product, newest first.
    async fn ledger_for_product(
        &self,
        tenant_id: TenantId,
        product_id: ProductId,
    ) -> StoreResult<Vec<LedgerEntry>>;

    /// All of the tenant's ledger entries, newest first.
    async fn ledger(&self, tenant_id: TenantId) -> StoreResult<Vec<LedgerEntry>>;
}

/// Measurements and tailoring tasks.
#[async_trait]
pub trait TailoringStore: Send + Sync {
    async fn insert_measurement(&self, measurement: Measurement) -> StoreResult<()>;
    async fn get_measurement(
        &self,
        tenant_id: TenantId,
        id: MeasurementId,
    ) -> StoreResult<Option<Measurement>>;
    async fn list_measurements(&self, tenant_id: TenantId) -> StoreResult<Vec<Measurement>>;
    async fn measurements_for_customer(
        &self,
        tenant_id: TenantId,
        customer_id: CustomerId,
    ) -> StoreResult<Vec<Measurement>>;
    async fn update_measurement(&self, measurement: Measurement) -> StoreResult<()>;
    async fn delete_measurement(&self, tenant_id: TenantId, id: MeasurementId)
        -> StoreResult<bool>;

    async fn insert_task(&self, task: Task) -> StoreResult<()>;
    async fn get_task(&self, tenant_id: TenantId, id: TaskId) -> StoreResult<Option<Task>>;
    /// Tasks ordered by due date, soonest first.
    async fn list_tasks(&self, tenant_id: TenantId) -> StoreResult<Vec<Task>>;
    async fn update_task(&self, task: Task) -> StoreResult<()>;
    async fn delete_task(&self, tenant_id: TenantId, id: TaskId) -> StoreResult<bool>;
}
