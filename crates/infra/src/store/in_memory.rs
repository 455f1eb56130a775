//! In-memory store for tests/dev. Not optimized for performance.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use shoploom_accounts::{Business, Industry, User};
use shoploom_catalog::{Category, Product, ProductFilter};
use shoploom_core::{
    CategoryId, CustomerId, DomainError, Entity, IndustryId, LedgerEntryId, MeasurementId,
    ProductId, TaskId, TenantId, UserId,
};
use shoploom_customers::Customer;
use shoploom_inventory::{apply_change, ChangeType, LedgerEntry};
use shoploom_tailoring::{Measurement, Task};
use shoploom_tenancy::TenantScoped;

use crate::{StoreError, StoreResult};

use super::{
    AccountStore, CatalogStore, CustomerStore, InventoryStore, StockOutcome, TailoringStore,
};

#[derive(Debug, Default)]
struct AccountTables {
    industries: HashMap<IndustryId, Industry>,
    businesses: HashMap<TenantId, Business>,
    users: HashMap<UserId, User>,
}

/// Products and their ledger share one lock: the stock path reads, decides
/// and writes both tables as a unit, which is what serializes concurrent
/// changes against the same product.
#[derive(Debug, Default)]
struct StockTables {
    products: HashMap<(TenantId, ProductId), Product>,
    ledger: Vec<LedgerEntry>,
}

/// In-memory implementation of every store trait.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    accounts: RwLock<AccountTables>,
    customers: RwLock<HashMap<(TenantId, CustomerId), Customer>>,
    categories: RwLock<HashMap<(TenantId, CategoryId), Category>>,
    stock: RwLock<StockTables>,
    measurements: RwLock<HashMap<(TenantId, MeasurementId), Measurement>>,
    tasks: RwLock<HashMap<(TenantId, TaskId), Task>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_poisoned(operation: &'static str) -> StoreError {
    StoreError::backend(operation, "lock poisoned")
}

#[async_trait]
impl AccountStore for InMemoryStore {
    async fn insert_industry(&self, industry: Industry) -> StoreResult<()> {
        let mut tables = self.accounts.write().map_err(|_| lock_poisoned("insert_industry"))?;
        if tables.industries.values().any(|i| i.name() == industry.name()) {
            return Err(DomainError::conflict("industry name already exists").into());
        }
        tables.industries.insert(*industry.id(), industry);
        Ok(())
    }

    async fn get_industry(&self, id: IndustryId) -> StoreResult<Option<Industry>> {
        let tables = self.accounts.read().map_err(|_| lock_poisoned("get_industry"))?;
        Ok(tables.industries.get(&id).cloned())
    }

    async fn list_industries(&self) -> StoreResult<Vec<Industry>> {
        let tables = self.accounts.read().map_err(|_| lock_poisoned("list_industries"))?;
        let mut industries: Vec<_> = tables.industries.values().cloned().collect();
        industries.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(industries)
    }

    async fn insert_business(&self, business: Business) -> StoreResult<()> {
        let mut tables = self.accounts.write().map_err(|_| lock_poisoned("insert_business"))?;
        if tables.businesses.values().any(|b| b.email() == business.email()) {
            return Err(DomainError::conflict("business email already registered").into());
        }
        tables.businesses.insert(*business.id(), business);
        Ok(())
    }

    async fn get_business(&self, id: TenantId) -> StoreResult<Option<Business>> {
        let tables = self.accounts.read().map_err(|_| lock_poisoned("get_business"))?;
        Ok(tables.businesses.get(&id).cloned())
    }

    async fn update_business(&self, business: Business) -> StoreResult<()> {
        let mut tables = self.accounts.write().map_err(|_| lock_poisoned("update_business"))?;
        if !tables.businesses.contains_key(business.id()) {
            return Err(DomainError::not_found().into());
        }
        tables.businesses.insert(*business.id(), business);
        Ok(())
    }

    async fn insert_user(&self, user: User) -> StoreResult<()> {
        let mut tables = self.accounts.write().map_err(|_| lock_poisoned("insert_user"))?;
        if tables.users.values().any(|u| u.email() == user.email()) {
            return Err(DomainError::conflict("user email already registered").into());
        }
        tables.users.insert(*user.id(), user);
        Ok(())
    }

    async fn get_user(&self, id: UserId) -> StoreResult<Option<User>> {
        let tables = self.accounts.read().map_err(|_| lock_poisoned("get_user"))?;
        Ok(tables.users.get(&id).cloned())
    }

    async fn update_user(&self, user: User) -> StoreResult<()> {
        let mut tables = self.accounts.write().map_err(|_| lock_poisoned("update_user"))?;
        if !tables.users.contains_key(user.id()) {
            return Err(DomainError::not_found().into());
        }
        tables.users.insert(*user.id(), user);
        Ok(())
    }
}

#[async_trait]
impl CustomerStore for InMemoryStore {
    async fn insert(&self, customer: Customer) -> StoreResult<()> {
        let mut customers = self.customers.write().map_err(|_| lock_poisoned("insert_customer"))?;
        let tenant_id = customer.tenant_id();
        let duplicate = customers
            .values()
            .any(|c| c.tenant_id() == tenant_id && c.phone() == customer.phone());
        if duplicate {
            return Err(DomainError::conflict("phone number already in use").into());
        }
        customers.insert((tenant_id, *customer.id()), customer);
        Ok(())
    }

    async fn get(&self, tenant_id: TenantId, id: CustomerId) -> StoreResult<Option<Customer>> {
        let customers = self.customers.read().map_err(|_| lock_poisoned("get_customer"))?;
        Ok(customers.get(&(tenant_id, id)).cloned())
    }

    async fn list(&self, tenant_id: TenantId) -> StoreResult<Vec<Customer>> {
        let customers = self.customers.read().map_err(|_| lock_poisoned("list_customers"))?;
        let mut rows: Vec<_> = customers
            .iter()
            .filter(|((t, _), _)| *t == tenant_id)
            .map(|(_, c)| c.clone())
            .collect();
        rows.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(rows)
    }

    async fn update(&self, customer: Customer) -> StoreResult<()> {
        let mut customers = self.customers.write().map_err(|_| lock_poisoned("update_customer"))?;
        let tenant_id = customer.tenant_id();
        let key = (tenant_id, *customer.id());
        if !customers.contains_key(&key) {
            return Err(DomainError::not_found().into());
        }
        let duplicate = customers.values().any(|c| {
            c.tenant_id() == tenant_id && c.id() != customer.id() && c.phone() == customer.phone()
        });
        if duplicate {
            return Err(DomainError::conflict("phone number already in use").into());
        }
        customers.insert(key, customer);
        Ok(())
    }

    async fn delete(&self, tenant_id: TenantId, id: CustomerId) -> StoreResult<bool> {
        let mut customers = self.customers.write().map_err(|_| lock_poisoned("delete_customer"))?;
        let removed = customers.remove(&(tenant_id, id)).is_some();
        drop(customers);

        if removed {
            // The customer's measurements and tasks go with it.
            let mut measurements = self
                .measurements
                .write()
                .map_err(|_| lock_poisoned("delete_customer"))?;
            measurements.retain(|(t, _), m| !(*t == tenant_id && m.customer_id() == id));
            drop(measurements);

            let mut tasks = self.tasks.write().map_err(|_| lock_poisoned("delete_customer"))?;
            tasks.retain(|(t, _), task| !(*t == tenant_id && task.customer_id() == id));
        }
        Ok(removed)
    }

    async fn find_by_phone(
        &self,
        tenant_id: TenantId,
        phone: &str,
    ) -> StoreResult<Option<Customer>> {
        let customers = self.customers.read().map_err(|_| lock_poisoned("find_by_phone"))?;
        Ok(customers
            .iter()
            .find(|((t, _), c)| *t == tenant_id && c.phone() == phone)
            .map(|(_, c)| c.clone()))
    }
}

#[async_trait]
impl CatalogStore for InMemoryStore {
    async fn insert_category(&self, category: Category) -> StoreResult<()> {
        let mut categories = self.categories.write().map_err(|_| lock_poisoned("insert_category"))?;
        let tenant_id = category.tenant_id();
        let duplicate = categories
            .values()
            .any(|c| c.tenant_id() == tenant_id && c.name() == category.name());
        if duplicate {
            return Err(DomainError::conflict("category name already exists").into());
        }
        categories.insert((tenant_id, *category.id()), category);
        Ok(())
    }

    async fn get_category(
        &self,
        tenant_id: TenantId,
        id: CategoryId,
    ) -> StoreResult<Option<Category>> {
        let categories = self.categories.read().map_err(|_| lock_poisoned("get_category"))?;
        Ok(categories.get(&(tenant_id, id)).cloned())
    }

    async fn list_categories(&self, tenant_id: TenantId) -> StoreResult<Vec<Category>> {
        let categories = self.categories.read().map_err(|_| lock_poisoned("list_categories"))?;
        let mut rows: Vec<_> = categories
            .iter()
            .filter(|((t, _), _)| *t == tenant_id)
            .map(|(_, c)| c.clone())
            .collect();
        rows.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(rows)
    }

    async fn update_category(&self, category: Category) -> StoreResult<()> {
        let mut categories = self.categories.write().map_err(|_| lock_poisoned("update_category"))?;
        let tenant_id = category.tenant_id();
        let key = (tenant_id, *category.id());
        if !categories.contains_key(&key) {
            return Err(DomainError::not_found().into());
        }
        let duplicate = categories.values().any(|c| {
            c.tenant_id() == tenant_id && c.id() != category.id() && c.name() == category.name()
        });
        if duplicate {
            return Err(DomainError::conflict("category name already exists").into());
        }
        categories.insert(key, category);
        Ok(())
    }

    async fn delete_category(&self, tenant_id: TenantId, id: CategoryId) -> StoreResult<bool> {
        let mut categories = self.categories.write().map_err(|_| lock_poisoned("delete_category"))?;
        let removed = categories.remove(&(tenant_id, id)).is_some();
        drop(categories);

        if removed {
            // Products keep existing but lose the category reference.
            let mut stock = self.stock.write().map_err(|_| lock_poisoned("delete_category"))?;
            for ((t, _), product) in stock.products.iter_mut() {
                if *t == tenant_id && product.category_id() == Some(id) {
                    product.apply_patch(
                        shoploom_catalog::ProductPatch {
                            category_id: Some(None),
                            ..shoploom_catalog::ProductPatch::default()
                        },
                        Utc::now(),
                    )?;
                }
            }
        }
        Ok(removed)
    }

    async fn insert_product(&self, product: Product) -> StoreResult<()> {
        let mut stock = self.stock.write().map_err(|_| lock_poisoned("insert_product"))?;
        stock.products.insert((product.tenant_id(), *product.id()), product);
        Ok(())
    }

    async fn get_product(
        &self,
        tenant_id: TenantId,
        id: ProductId,
    ) -> StoreResult<Option<Product>> {
        let stock = self.stock.read().map_err(|_| lock_poisoned("get_product"))?;
        Ok(stock.products.get(&(tenant_id, id)).cloned())
    }

    async fn list_products(
        &self,
        tenant_id: TenantId,
        filter: &ProductFilter,
    ) -> StoreResult<Vec<Product>> {
        let stock = self.stock.read().map_err(|_| lock_poisoned("list_products"))?;
        let mut rows: Vec<_> = stock
            .products
            .iter()
            .filter(|((t, _), p)| *t == tenant_id && filter.matches(p))
            .map(|(_, p)| p.clone())
            .collect();
        rows.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(rows)
    }

    async fn update_product(&self, product: Product) -> StoreResult<()> {
        let mut stock = self.stock.write().map_err(|_| lock_poisoned("update_product"))?;
        let key = (product.tenant_id(), *product.id());
        let Some(existing) = stock.products.get(&key) else {
            return Err(DomainError::not_found().into());
        };

        // Quantity only moves through the stock path; carry the stored value
        // over in case a concurrent change landed after the caller's read.
        let stored_quantity = existing.quantity();
        let mut product = product;
        if product.quantity() != stored_quantity {
            product.apply_stock(stored_quantity, Utc::now());
        }
        stock.products.insert(key, product);
        Ok(())
    }

    async fn delete_product(&self, tenant_id: TenantId, id: ProductId) -> StoreResult<bool> {
        let mut stock = self.stock.write().map_err(|_| lock_poisoned("delete_product"))?;
        let removed = stock.products.remove(&(tenant_id, id)).is_some();
        if removed {
            // Audit entries are scoped to the product's lifetime.
            stock
                .ledger
                .retain(|e| !(e.tenant_id() == tenant_id && e.product_id() == id));
        }
        Ok(removed)
    }

    async fn low_stock_products(&self, tenant_id: TenantId) -> StoreResult<Vec<Product>> {
        let all = self.list_products(tenant_id, &ProductFilter::default()).await?;
        Ok(all.into_iter().filter(Product::is_low_stock).collect())
    }

    async fn out_of_stock_products(&self, tenant_id: TenantId) -> StoreResult<Vec<Product>> {
        let all = self.list_products(tenant_id, &ProductFilter::default()).await?;
        Ok(all.into_iter().filter(Product::is_out_of_stock).collect())
    }
}

#[async_trait]
impl InventoryStore for InMemoryStore {
    async fn apply_stock_change(
        &self,
        tenant_id: TenantId,
        product_id: ProductId,
        change_type: ChangeType,
        quantity: i64,
        actor: UserId,
        notes: String,
    ) -> StoreResult<StockOutcome> {
        // One write lock over products + ledger for the whole
        // read-decide-write: concurrent changes to the same product
        // serialize here, and a rejected change releases the lock with
        // nothing written.
        let mut stock = self.stock.write().map_err(|_| lock_poisoned("apply_stock_change"))?;

        let product = stock
            .products
            .get(&(tenant_id, product_id))
            .ok_or(DomainError::NotFound)?;

        let now = Utc::now();
        let change = apply_change(
            product,
            change_type,
            quantity,
            actor,
            notes,
            LedgerEntryId::new(),
            now,
        )?;

        let product = stock
            .products
            .get_mut(&(tenant_id, product_id))
            .ok_or(DomainError::NotFound)?;
        product.apply_stock(change.new_quantity, now);
        let product = product.clone();

        stock.ledger.push(change.entry.clone());

        Ok(StockOutcome {
            product,
            entry: change.entry,
        })
    }

    async fn ledger_for_product(
        &self,
        tenant_id: TenantId,
        product_id: ProductId,
    ) -> StoreResult<Vec<LedgerEntry>> {
        let stock = self.stock.read().map_err(|_| lock_poisoned("ledger_for_product"))?;
        Ok(stock
            .ledger
            .iter()
            .rev()
            .filter(|e| e.tenant_id() == tenant_id && e.product_id() == product_id)
            .cloned()
            .collect())
    }

    async fn ledger(&self, tenant_id: TenantId) -> StoreResult<Vec<LedgerEntry>> {
        let stock = self.stock.read().map_err(|_| lock_poisoned("ledger"))?;
        Ok(stock
            .ledger
            .iter()
            .rev()
            .filter(|e| e.tenant_id() == tenant_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl TailoringStore for InMemoryStore {
    async fn insert_measurement(&self, measurement: Measurement) -> StoreResult<()> {
        let mut measurements = self
            .measurements
            .write()
            .map_err(|_| lock_poisoned("insert_measurement"))?;
        measurements.insert((measurement.tenant_id(), *measurement.id()), measurement);
        Ok(())
    }

    async fn get_measurement(
        &self,
        tenant_id: TenantId,
        id: MeasurementId,
    ) -> StoreResult<Option<Measurement>> {
        let measurements = self.measurements.read().map_err(|_| lock_poisoned("get_measurement"))?;
        Ok(measurements.get(&(tenant_id, id)).cloned())
    }

    async fn list_measurements(&self, tenant_id: TenantId) -> StoreResult<Vec<Measurement>> {
        let measurements = self
            .measurements
            .read()
            .map_err(|_| lock_poisoned("list_measurements"))?;
        let mut rows: Vec<_> = measurements
            .iter()
            .filter(|((t, _), _)| *t == tenant_id)
            .map(|(_, m)| m.clone())
            .collect();
        rows.sort_by(|a, b| b.date_taken().cmp(&a.date_taken()));
        Ok(rows)
    }

    async fn measurements_for_customer(
        &self,
        tenant_id: TenantId,
        customer_id: CustomerId,
    ) -> StoreResult<Vec<Measurement>> {
        let all = self.list_measurements(tenant_id).await?;
        Ok(all
            .into_iter()
            .filter(|m| m.customer_id() == customer_id)
            .collect())
    }

    async fn update_measurement(&self, measurement: Measurement) -> StoreResult<()> {
        let mut measurements = self
            .measurements
            .write()
            .map_err(|_| lock_poisoned("update_measurement"))?;
        let key = (measurement.tenant_id(), *measurement.id());
        if !measurements.contains_key(&key) {
            return Err(DomainError::not_found().into());
        }
        measurements.insert(key, measurement);
        Ok(())
    }

    async fn delete_measurement(
        &self,
        tenant_id: TenantId,
        id: MeasurementId,
    ) -> StoreResult<bool> {
        let mut measurements = self
            .measurements
            .write()
            .map_err(|_| lock_poisoned("delete_measurement"))?;
        Ok(measurements.remove(&(tenant_id, id)).is_some())
    }

    async fn insert_task(&self, task: Task) -> StoreResult<()> {
        let mut tasks = self.tasks.write().map_err(|_| lock_poisoned("insert_task"))?;
        tasks.insert((task.tenant_id(), *task.id()), task);
        Ok(())
    }

    async fn get_task(&self, tenant_id: TenantId, id: TaskId) -> StoreResult<Option<Task>> {
        let tasks = self.tasks.read().map_err(|_| lock_poisoned("get_task"))?;
        Ok(tasks.get(&(tenant_id, id)).cloned())
    }

    async fn list_tasks(&self, tenant_id: TenantId) -> StoreResult<Vec<Task>> {
        let tasks = self.tasks.read().map_err(|_| lock_poisoned("list_tasks"))?;
        let mut rows: Vec<_> = tasks
            .iter()
            .filter(|((t, _), _)| *t == tenant_id)
            .map(|(_, task)| task.clone())
            .collect();
        rows.sort_by(|a, b| {
            a.due_date()
                .cmp(&b.due_date())
                .then(b.created_at().cmp(&a.created_at()))
        });
        Ok(rows)
    }

    async fn update_task(&self, task: Task) -> StoreResult<()> {
        let mut tasks = self.tasks.write().map_err(|_| lock_poisoned("update_task"))?;
        let key = (task.tenant_id(), *task.id());
        if !tasks.contains_key(&key) {
            return Err(DomainError::not_found().into());
        }
        tasks.insert(key, task);
        Ok(())
    }

    async fn delete_task(&self, tenant_id: TenantId, id: TaskId) -> StoreResult<bool> {
        let mut tasks = self.tasks.write().map_err(|_| lock_poisoned("delete_task"))?;
        Ok(tasks.remove(&(tenant_id, id)).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use shoploom_catalog::NewProduct;
    use shoploom_customers::NewCustomer;

    fn product_with(tenant_id: TenantId, quantity: i64) -> Product {
        let mut p = Product::create(
            ProductId::new(),
            tenant_id,
            NewProduct {
                name: "Wax Print".to_string(),
                description: String::new(),
                category_id: None,
                price_cents: 2_500,
                low_stock_threshold: None,
                sku: String::new(),
            },
            Utc::now(),
        )
        .unwrap();
        if quantity > 0 {
            p.apply_stock(quantity, Utc::now());
        }
        p
    }

    fn customer(tenant_id: TenantId, phone: &str) -> Customer {
        Customer::create(
            CustomerId::new(),
            tenant_id,
            NewCustomer {
                name: "Akosua".to_string(),
                phone: phone.to_string(),
                email: None,
                address: String::new(),
                notes: String::new(),
            },
            Utc::now(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn customer_phone_is_unique_per_tenant_only() {
        let store = InMemoryStore::new();
        let (a, b) = (TenantId::new(), TenantId::new());

        store.insert(customer(a, "0241")).await.unwrap();
        // Same phone, other tenant: fine.
        store.insert(customer(b, "0241")).await.unwrap();

        let err = store.insert(customer(a, "0241")).await.unwrap_err();
        assert!(matches!(err.as_domain(), Some(DomainError::Conflict(_))));
    }

    #[tokio::test]
    async fn lists_are_tenant_confined() {
        let store = InMemoryStore::new();
        let (a, b) = (TenantId::new(), TenantId::new());

        store.insert(customer(a, "0100")).await.unwrap();
        store.insert(customer(b, "0200")).await.unwrap();

        let listed = store.list(a).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].phone(), "0100");
    }

    #[tokio::test]
    async fn stock_change_updates_product_and_ledger_together() {
        let store = InMemoryStore::new();
        let tenant_id = TenantId::new();
        let product = product_with(tenant_id, 0);
        let product_id = *product.id();
        store.insert_product(product).await.unwrap();

        let outcome = store
            .apply_stock_change(
                tenant_id,
                product_id,
                ChangeType::Restock,
                12,
                UserId::new(),
                String::new(),
            )
            .await
            .unwrap();

        assert_eq!(outcome.product.quantity(), 12);
        assert_eq!(outcome.entry.before(), 0);
        assert_eq!(outcome.entry.after(), 12);

        let stored = store.get_product(tenant_id, product_id).await.unwrap().unwrap();
        assert_eq!(stored.quantity(), 12);
        assert_eq!(store.ledger_for_product(tenant_id, product_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn rejected_stock_change_persists_nothing() {
        let store = InMemoryStore::new();
        let tenant_id = TenantId::new();
        let product = product_with(tenant_id, 5);
        let product_id = *product.id();
        store.insert_product(product).await.unwrap();

        let err = store
            .apply_stock_change(
                tenant_id,
                product_id,
                ChangeType::Sale,
                6,
                UserId::new(),
                String::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_domain(),
            Some(DomainError::InsufficientStock { available: 5, requested: 6 })
        ));

        let stored = store.get_product(tenant_id, product_id).await.unwrap().unwrap();
        assert_eq!(stored.quantity(), 5);
        assert!(store.ledger_for_product(tenant_id, product_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn product_update_cannot_smuggle_quantity() {
        let store = InMemoryStore::new();
        let tenant_id = TenantId::new();
        let product = product_with(tenant_id, 0);
        let product_id = *product.id();
        store.insert_product(product.clone()).await.unwrap();

        store
            .apply_stock_change(
                tenant_id,
                product_id,
                ChangeType::Restock,
                9,
                UserId::new(),
                String::new(),
            )
            .await
            .unwrap();

        // Caller updates from a stale copy still carrying quantity 0.
        store.update_product(product).await.unwrap();

        let stored = store.get_product(tenant_id, product_id).await.unwrap().unwrap();
        assert_eq!(stored.quantity(), 9);
    }

    #[tokio::test]
    async fn deleting_a_product_drops_its_ledger() {
        let store = InMemoryStore::new();
        let tenant_id = TenantId::new();
        let product = product_with(tenant_id, 0);
        let product_id = *product.id();
        store.insert_product(product).await.unwrap();
        store
            .apply_stock_change(
                tenant_id,
                product_id,
                ChangeType::Restock,
                3,
                UserId::new(),
                String::new(),
            )
            .await
            .unwrap();

        assert!(store.delete_product(tenant_id, product_id).await.unwrap());
        assert!(store.ledger(tenant_id).await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn concurrent_stock_changes_lose_no_updates() {
        let store = Arc::new(InMemoryStore::new());
        let tenant_id = TenantId::new();
        let product = product_with(tenant_id, 0);
        let product_id = *product.id();
        store.insert_product(product).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..64 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .apply_stock_change(
                        tenant_id,
                        product_id,
                        ChangeType::Restock,
                        1,
                        UserId::new(),
                        String::new(),
                    )
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let stored = store.get_product(tenant_id, product_id).await.unwrap().unwrap();
        assert_eq!(stored.quantity(), 64);
        assert_eq!(store.ledger_for_product(tenant_id, product_id).await.unwrap().len(), 64);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn concurrent_sales_never_oversell() {
        let store = Arc::new(InMemoryStore::new());
        let tenant_id = TenantId::new();
        let product = product_with(tenant_id, 10);
        let product_id = *product.id();
        store.insert_product(product).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..32 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .apply_stock_change(
                        tenant_id,
                        product_id,
                        ChangeType::Sale,
                        1,
                        UserId::new(),
                        String::new(),
                    )
                    .await
            }));
        }

        let mut accepted = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                accepted += 1;
            }
        }

        assert_eq!(accepted, 10);
        let stored = store.get_product(tenant_id, product_id).await.unwrap().unwrap();
        assert_eq!(stored.quantity(), 0);
        assert_eq!(
            store.ledger_for_product(tenant_id, product_id).await.unwrap().len(),
            10
        );
    }
}
