//! Postgres-backed store implementation.
//!
//! Entities persist as JSONB payloads beside the columns queries need
//! (tenant, id, uniqueness keys, sort keys). Schema migrations live outside
//! this crate; the expected tables are:
//!
//! | table | columns | constraints |
//! |---|---|---|
//! | `industries` | `id uuid, name text, payload jsonb` | pk `id`, unique `name` |
//! | `businesses` | `id uuid, email text, payload jsonb` | pk `id`, unique `email` |
//! | `users` | `id uuid, email text, payload jsonb` | pk `id`, unique `email` |
//! | `customers` | `tenant_id uuid, id uuid, phone text, created_at timestamptz, payload jsonb` | pk `(tenant_id, id)`, unique `(tenant_id, phone)` |
//! | `categories` | `tenant_id uuid, id uuid, name text, payload jsonb` | pk `(tenant_id, id)`, unique `(tenant_id, name)` |
//! | `products` | `tenant_id uuid, id uuid, quantity bigint, created_at timestamptz, payload jsonb` | pk `(tenant_id, id)` |
//! | `inventory_ledger` | `tenant_id uuid, id uuid, product_id uuid, occurred_at timestamptz, payload jsonb` | pk `id`; append-only |
//! | `measurements` | `tenant_id uuid, id uuid, customer_id uuid, date_taken date, payload jsonb` | pk `(tenant_id, id)` |
//! | `tasks` | `tenant_id uuid, id uuid, customer_id uuid, due_date date, created_at timestamptz, payload jsonb` | pk `(tenant_id, id)` |
//!
//! ## Error mapping
//!
//! | PostgreSQL error | `StoreError` | scenario |
//! |---|---|---|
//! | `23505` unique violation | `Domain(Conflict)` | duplicate email/phone/name |
//! | other database errors | `Backend` | pool, network, constraint issues |
//!
//! ## Tenant isolation
//!
//! Every tenant-scoped query carries `tenant_id` in the WHERE clause; a row
//! of another tenant is unreachable regardless of what id the caller holds.
//!
//! ## Stock changes
//!
//! `apply_stock_change` takes a row lock (`SELECT ... FOR UPDATE`) on the
//! product inside a transaction, decides the change, then commits the
//! quantity update and the ledger insert together; concurrent changes to
//! one product serialize on the row lock, and a rejected change rolls back
//! with nothing written.

use async_trait::async_trait;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::{PgPool, Row};
use std::sync::Arc;
use tracing::instrument;

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

/// Postgres-backed implementation of every store trait.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: Arc<PgPool>,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

fn map_sqlx_error(operation: &'static str, e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &e {
        if db.code().as_deref() == Some("23505") {
            return DomainError::conflict(format!("unique constraint violated: {}", db.message()))
                .into();
        }
    }
    StoreError::backend(operation, e.to_string())
}

fn encode<T: Serialize>(operation: &'static str, value: &T) -> StoreResult<serde_json::Value> {
    serde_json::to_value(value).map_err(|e| StoreError::backend(operation, e.to_string()))
}

fn decode<T: DeserializeOwned>(operation: &'static str, value: serde_json::Value) -> StoreResult<T> {
    serde_json::from_value(value).map_err(|e| StoreError::backend(operation, e.to_string()))
}

fn decode_rows<T: DeserializeOwned>(
    operation: &'static str,
    rows: Vec<sqlx::postgres::PgRow>,
) -> StoreResult<Vec<T>> {
    rows.into_iter()
        .map(|row| {
            let payload: serde_json::Value = row
                .try_get("payload")
                .map_err(|e| StoreError::backend(operation, e.to_string()))?;
            decode(operation, payload)
        })
        .collect()
}

fn decode_optional<T: DeserializeOwned>(
    operation: &'static str,
    row: Option<sqlx::postgres::PgRow>,
) -> StoreResult<Option<T>> {
    match row {
        Some(row) => {
            let payload: serde_json::Value = row
                .try_get("payload")
                .map_err(|e| StoreError::backend(operation, e.to_string()))?;
            Ok(Some(decode(operation, payload)?))
        }
        None => Ok(None),
    }
}

#[async_trait]
impl AccountStore for PostgresStore {
    async fn insert_industry(&self, industry: Industry) -> StoreResult<()> {
        const OP: &str = "insert_industry";
        sqlx::query("INSERT INTO industries (id, name, payload) VALUES ($1, $2, $3)")
            .bind(industry.id().as_uuid())
            .bind(industry.name())
            .bind(encode(OP, &industry)?)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error(OP, e))?;
        Ok(())
    }

    async fn get_industry(&self, id: IndustryId) -> StoreResult<Option<Industry>> {
        const OP: &str = "get_industry";
        let row = sqlx::query("SELECT payload FROM industries WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error(OP, e))?;
        decode_optional(OP, row)
    }

    async fn list_industries(&self) -> StoreResult<Vec<Industry>> {
        const OP: &str = "list_industries";
        let rows = sqlx::query("SELECT payload FROM industries ORDER BY name ASC")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error(OP, e))?;
        decode_rows(OP, rows)
    }

    async fn insert_business(&self, business: Business) -> StoreResult<()> {
        const OP: &str = "insert_business";
        sqlx::query("INSERT INTO businesses (id, email, payload) VALUES ($1, $2, $3)")
            .bind(business.id().as_uuid())
            .bind(business.email())
            .bind(encode(OP, &business)?)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error(OP, e))?;
        Ok(())
    }

    async fn get_business(&self, id: TenantId) -> StoreResult<Option<Business>> {
        const OP: &str = "get_business";
        let row = sqlx::query("SELECT payload FROM businesses WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error(OP, e))?;
        decode_optional(OP, row)
    }

    async fn update_business(&self, business: Business) -> StoreResult<()> {
        const OP: &str = "update_business";
        let result = sqlx::query("UPDATE businesses SET email = $2, payload = $3 WHERE id = $1")
            .bind(business.id().as_uuid())
            .bind(business.email())
            .bind(encode(OP, &business)?)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error(OP, e))?;
        if result.rows_affected() == 0 {
            return Err(DomainError::not_found().into());
        }
        Ok(())
    }

    async fn insert_user(&self, user: User) -> StoreResult<()> {
        const OP: &str = "insert_user";
        sqlx::query("INSERT INTO users (id, email, payload) VALUES ($1, $2, $3)")
            .bind(user.id().as_uuid())
            .bind(user.email())
            .bind(encode(OP, &user)?)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error(OP, e))?;
        Ok(())
    }

    async fn get_user(&self, id: UserId) -> StoreResult<Option<User>> {
        const OP: &str = "get_user";
        let row = sqlx::query("SELECT payload FROM users WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error(OP, e))?;
        decode_optional(OP, row)
    }

    async fn update_user(&self, user: User) -> StoreResult<()> {
        const OP: &str = "update_user";
        let result = sqlx::query("UPDATE users SET email = $2, payload = $3 WHERE id = $1")
            .bind(user.id().as_uuid())
            .bind(user.email())
            .bind(encode(OP, &user)?)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error(OP, e))?;
        if result.rows_affected() == 0 {
            return Err(DomainError::not_found().into());
        }
        Ok(())
    }
}

#[async_trait]
impl CustomerStore for PostgresStore {
    async fn insert(&self, customer: Customer) -> StoreResult<()> {
        const OP: &str = "insert_customer";
        sqlx::query(
            "INSERT INTO customers (tenant_id, id, phone, created_at, payload) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(customer.tenant_id().as_uuid())
        .bind(customer.id().as_uuid())
        .bind(customer.phone())
        .bind(customer.created_at())
        .bind(encode(OP, &customer)?)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error(OP, e))?;
        Ok(())
    }

    async fn get(&self, tenant_id: TenantId, id: CustomerId) -> StoreResult<Option<Customer>> {
        const OP: &str = "get_customer";
        let row = sqlx::query("SELECT payload FROM customers WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id.as_uuid())
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error(OP, e))?;
        decode_optional(OP, row)
    }

    async fn list(&self, tenant_id: TenantId) -> StoreResult<Vec<Customer>> {
        const OP: &str = "list_customers";
        let rows = sqlx::query(
            "SELECT payload FROM customers WHERE tenant_id = $1 ORDER BY created_at DESC",
        )
        .bind(tenant_id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error(OP, e))?;
        decode_rows(OP, rows)
    }

    async fn update(&self, customer: Customer) -> StoreResult<()> {
        const OP: &str = "update_customer";
        let result = sqlx::query(
            "UPDATE customers SET phone = $3, payload = $4 WHERE tenant_id = $1 AND id = $2",
        )
        .bind(customer.tenant_id().as_uuid())
        .bind(customer.id().as_uuid())
        .bind(customer.phone())
        .bind(encode(OP, &customer)?)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error(OP, e))?;
        if result.rows_affected() == 0 {
            return Err(DomainError::not_found().into());
        }
        Ok(())
    }

    #[instrument(skip(self), fields(tenant_id = %tenant_id, customer_id = %id))]
    async fn delete(&self, tenant_id: TenantId, id: CustomerId) -> StoreResult<bool> {
        const OP: &str = "delete_customer";
        let mut tx = self.pool.begin().await.map_err(|e| map_sqlx_error(OP, e))?;

        let result = sqlx::query("DELETE FROM customers WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id.as_uuid())
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error(OP, e))?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        // The customer's measurements and tasks go with it.
        sqlx::query("DELETE FROM measurements WHERE tenant_id = $1 AND customer_id = $2")
            .bind(tenant_id.as_uuid())
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error(OP, e))?;
        sqlx::query("DELETE FROM tasks WHERE tenant_id = $1 AND customer_id = $2")
            .bind(tenant_id.as_uuid())
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error(OP, e))?;

        tx.commit().await.map_err(|e| map_sqlx_error(OP, e))?;
        Ok(true)
    }

    async fn find_by_phone(
        &self,
        tenant_id: TenantId,
        phone: &str,
    ) -> StoreResult<Option<Customer>> {
        const OP: &str = "find_customer_by_phone";
        let row = sqlx::query("SELECT payload FROM customers WHERE tenant_id = $1 AND phone = $2")
            .bind(tenant_id.as_uuid())
            .bind(phone)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error(OP, e))?;
        decode_optional(OP, row)
    }
}

#[async_trait]
impl CatalogStore for PostgresStore {
    async fn insert_category(&self, category: Category) -> StoreResult<()> {
        const OP: &str = "insert_category";
        sqlx::query(
            "INSERT INTO categories (tenant_id, id, name, payload) VALUES ($1, $2, $3, $4)",
        )
        .bind(category.tenant_id().as_uuid())
        .bind(category.id().as_uuid())
        .bind(category.name())
        .bind(encode(OP, &category)?)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error(OP, e))?;
        Ok(())
    }

    async fn get_category(
        &self,
        tenant_id: TenantId,
        id: CategoryId,
    ) -> StoreResult<Option<Category>> {
        const OP: &str = "get_category";
        let row = sqlx::query("SELECT payload FROM categories WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id.as_uuid())
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error(OP, e))?;
        decode_optional(OP, row)
    }

    async fn list_categories(&self, tenant_id: TenantId) -> StoreResult<Vec<Category>> {
        const OP: &str = "list_categories";
        let rows =
            sqlx::query("SELECT payload FROM categories WHERE tenant_id = $1 ORDER BY name ASC")
                .bind(tenant_id.as_uuid())
                .fetch_all(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error(OP, e))?;
        decode_rows(OP, rows)
    }

    async fn update_category(&self, category: Category) -> StoreResult<()> {
        const OP: &str = "update_category";
        let result = sqlx::query(
            "UPDATE categories SET name = $3, payload = $4 WHERE tenant_id = $1 AND id = $2",
        )
        .bind(category.tenant_id().as_uuid())
        .bind(category.id().as_uuid())
        .bind(category.name())
        .bind(encode(OP, &category)?)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error(OP, e))?;
        if result.rows_affected() == 0 {
            return Err(DomainError::not_found().into());
        }
        Ok(())
    }

    #[instrument(skip(self), fields(tenant_id = %tenant_id, category_id = %id))]
    async fn delete_category(&self, tenant_id: TenantId, id: CategoryId) -> StoreResult<bool> {
        const OP: &str = "delete_category";
        let mut tx = self.pool.begin().await.map_err(|e| map_sqlx_error(OP, e))?;

        let result = sqlx::query("DELETE FROM categories WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id.as_uuid())
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error(OP, e))?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        // Products keep existing but lose the category reference.
        sqlx::query(
            "UPDATE products SET payload = jsonb_set(payload, '{category_id}', 'null') \
             WHERE tenant_id = $1 AND payload->>'category_id' = $2",
        )
        .bind(tenant_id.as_uuid())
        .bind(id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error(OP, e))?;

        tx.commit().await.map_err(|e| map_sqlx_error(OP, e))?;
        Ok(true)
    }

    async fn insert_product(&self, product: Product) -> StoreResult<()> {
        const OP: &str = "insert_product";
        sqlx::query(
            "INSERT INTO products (tenant_id, id, quantity, created_at, payload) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(product.tenant_id().as_uuid())
        .bind(product.id().as_uuid())
        .bind(product.quantity())
        .bind(product.created_at())
        .bind(encode(OP, &product)?)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error(OP, e))?;
        Ok(())
    }

    async fn get_product(
        &self,
        tenant_id: TenantId,
        id: ProductId,
    ) -> StoreResult<Option<Product>> {
        const OP: &str = "get_product";
        let row = sqlx::query("SELECT payload FROM products WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id.as_uuid())
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error(OP, e))?;
        decode_optional(OP, row)
    }

    async fn list_products(
        &self,
        tenant_id: TenantId,
        filter: &ProductFilter,
    ) -> StoreResult<Vec<Product>> {
        const OP: &str = "list_products";
        let rows = sqlx::query(
            "SELECT payload FROM products WHERE tenant_id = $1 ORDER BY created_at DESC",
        )
        .bind(tenant_id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error(OP, e))?;
        let products: Vec<Product> = decode_rows(OP, rows)?;
        Ok(products.into_iter().filter(|p| filter.matches(p)).collect())
    }

    async fn update_product(&self, product: Product) -> StoreResult<()> {
        const OP: &str = "update_product";
        // Quantity only moves through the stock path: keep the stored value
        // by splicing it back into the incoming payload.
        let result = sqlx::query(
            "UPDATE products SET payload = jsonb_set($3::jsonb, '{quantity}', payload->'quantity') \
             WHERE tenant_id = $1 AND id = $2",
        )
        .bind(product.tenant_id().as_uuid())
        .bind(product.id().as_uuid())
        .bind(encode(OP, &product)?)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error(OP, e))?;
        if result.rows_affected() == 0 {
            return Err(DomainError::not_found().into());
        }
        Ok(())
    }

    #[instrument(skip(self), fields(tenant_id = %tenant_id, product_id = %id))]
    async fn delete_product(&self, tenant_id: TenantId, id: ProductId) -> StoreResult<bool> {
        const OP: &str = "delete_product";
        let mut tx = self.pool.begin().await.map_err(|e| map_sqlx_error(OP, e))?;

        let result = sqlx::query("DELETE FROM products WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id.as_uuid())
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error(OP, e))?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        // Audit entries are scoped to the product's lifetime.
        sqlx::query("DELETE FROM inventory_ledger WHERE tenant_id = $1 AND product_id = $2")
            .bind(tenant_id.as_uuid())
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error(OP, e))?;

        tx.commit().await.map_err(|e| map_sqlx_error(OP, e))?;
        Ok(true)
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
impl InventoryStore for PostgresStore {
    #[instrument(
        skip(self, notes),
        fields(
            tenant_id = %tenant_id,
            product_id = %product_id,
            change_type = %change_type
        ),
        err
    )]
    async fn apply_stock_change(
        &self,
        tenant_id: TenantId,
        product_id: ProductId,
        change_type: ChangeType,
        quantity: i64,
        actor: UserId,
        notes: String,
    ) -> StoreResult<StockOutcome> {
        const OP: &str = "apply_stock_change";
        let mut tx = self.pool.begin().await.map_err(|e| map_sqlx_error(OP, e))?;

        // Row lock: concurrent changes to the same product queue here until
        // this transaction commits or rolls back.
        let row = sqlx::query(
            "SELECT payload FROM products WHERE tenant_id = $1 AND id = $2 FOR UPDATE",
        )
        .bind(tenant_id.as_uuid())
        .bind(product_id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error(OP, e))?;

        let mut product: Product =
            decode_optional(OP, row)?.ok_or(DomainError::NotFound)?;

        let now = Utc::now();
        let change = apply_change(
            &product,
            change_type,
            quantity,
            actor,
            notes,
            LedgerEntryId::new(),
            now,
        )?;

        product.apply_stock(change.new_quantity, now);

        sqlx::query(
            "UPDATE products SET quantity = $3, payload = $4 WHERE tenant_id = $1 AND id = $2",
        )
        .bind(tenant_id.as_uuid())
        .bind(product_id.as_uuid())
        .bind(product.quantity())
        .bind(encode(OP, &product)?)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error(OP, e))?;

        sqlx::query(
            "INSERT INTO inventory_ledger (tenant_id, id, product_id, occurred_at, payload) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(tenant_id.as_uuid())
        .bind(change.entry.id().as_uuid())
        .bind(product_id.as_uuid())
        .bind(change.entry.occurred_at())
        .bind(encode(OP, &change.entry)?)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error(OP, e))?;

        tx.commit().await.map_err(|e| map_sqlx_error(OP, e))?;

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
        const OP: &str = "ledger_for_product";
        let rows = sqlx::query(
            "SELECT payload FROM inventory_ledger \
             WHERE tenant_id = $1 AND product_id = $2 ORDER BY occurred_at DESC",
        )
        .bind(tenant_id.as_uuid())
        .bind(product_id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error(OP, e))?;
        decode_rows(OP, rows)
    }

    async fn ledger(&self, tenant_id: TenantId) -> StoreResult<Vec<LedgerEntry>> {
        const OP: &str = "ledger";
        let rows = sqlx::query(
            "SELECT payload FROM inventory_ledger WHERE tenant_id = $1 ORDER BY occurred_at DESC",
        )
        .bind(tenant_id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error(OP, e))?;
        decode_rows(OP, rows)
    }
}

#[async_trait]
impl TailoringStore for PostgresStore {
    async fn insert_measurement(&self, measurement: Measurement) -> StoreResult<()> {
        const OP: &str = "insert_measurement";
        sqlx::query(
            "INSERT INTO measurements (tenant_id, id, customer_id, date_taken, payload) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(measurement.tenant_id().as_uuid())
        .bind(measurement.id().as_uuid())
        .bind(measurement.customer_id().as_uuid())
        .bind(measurement.date_taken())
        .bind(encode(OP, &measurement)?)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error(OP, e))?;
        Ok(())
    }

    async fn get_measurement(
        &self,
        tenant_id: TenantId,
        id: MeasurementId,
    ) -> StoreResult<Option<Measurement>> {
        const OP: &str = "get_measurement";
        let row = sqlx::query("SELECT payload FROM measurements WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id.as_uuid())
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error(OP, e))?;
        decode_optional(OP, row)
    }

    async fn list_measurements(&self, tenant_id: TenantId) -> StoreResult<Vec<Measurement>> {
        const OP: &str = "list_measurements";
        let rows = sqlx::query(
            "SELECT payload FROM measurements WHERE tenant_id = $1 ORDER BY date_taken DESC",
        )
        .bind(tenant_id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error(OP, e))?;
        decode_rows(OP, rows)
    }

    async fn measurements_for_customer(
        &self,
        tenant_id: TenantId,
        customer_id: CustomerId,
    ) -> StoreResult<Vec<Measurement>> {
        const OP: &str = "measurements_for_customer";
        let rows = sqlx::query(
            "SELECT payload FROM measurements \
             WHERE tenant_id = $1 AND customer_id = $2 ORDER BY date_taken DESC",
        )
        .bind(tenant_id.as_uuid())
        .bind(customer_id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error(OP, e))?;
        decode_rows(OP, rows)
    }

    async fn update_measurement(&self, measurement: Measurement) -> StoreResult<()> {
        const OP: &str = "update_measurement";
        let result = sqlx::query(
            "UPDATE measurements SET date_taken = $3, payload = $4 \
             WHERE tenant_id = $1 AND id = $2",
        )
        .bind(measurement.tenant_id().as_uuid())
        .bind(measurement.id().as_uuid())
        .bind(measurement.date_taken())
        .bind(encode(OP, &measurement)?)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error(OP, e))?;
        if result.rows_affected() == 0 {
            return Err(DomainError::not_found().into());
        }
        Ok(())
    }

    async fn delete_measurement(
        &self,
        tenant_id: TenantId,
        id: MeasurementId,
    ) -> StoreResult<bool> {
        const OP: &str = "delete_measurement";
        let result = sqlx::query("DELETE FROM measurements WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id.as_uuid())
            .bind(id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error(OP, e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_task(&self, task: Task) -> StoreResult<()> {
        const OP: &str = "insert_task";
        sqlx::query(
            "INSERT INTO tasks (tenant_id, id, customer_id, due_date, created_at, payload) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(task.tenant_id().as_uuid())
        .bind(task.id().as_uuid())
        .bind(task.customer_id().as_uuid())
        .bind(task.due_date())
        .bind(task.created_at())
        .bind(encode(OP, &task)?)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error(OP, e))?;
        Ok(())
    }

    async fn get_task(&self, tenant_id: TenantId, id: TaskId) -> StoreResult<Option<Task>> {
        const OP: &str = "get_task";
        let row = sqlx::query("SELECT payload FROM tasks WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id.as_uuid())
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error(OP, e))?;
        decode_optional(OP, row)
    }

    async fn list_tasks(&self, tenant_id: TenantId) -> StoreResult<Vec<Task>> {
        const OP: &str = "list_tasks";
        let rows = sqlx::query(
            "SELECT payload FROM tasks WHERE tenant_id = $1 \
             ORDER BY due_date ASC, created_at DESC",
        )
        .bind(tenant_id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error(OP, e))?;
        decode_rows(OP, rows)
    }

    async fn update_task(&self, task: Task) -> StoreResult<()> {
        const OP: &str = "update_task";
        let result = sqlx::query(
            "UPDATE tasks SET due_date = $3, payload = $4 WHERE tenant_id = $1 AND id = $2",
        )
        .bind(task.tenant_id().as_uuid())
        .bind(task.id().as_uuid())
        .bind(task.due_date())
        .bind(encode(OP, &task)?)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error(OP, e))?;
        if result.rows_affected() == 0 {
            return Err(DomainError::not_found().into());
        }
        Ok(())
    }

    async fn delete_task(&self, tenant_id: TenantId, id: TaskId) -> StoreResult<bool> {
        const OP: &str = "delete_task";
        let result = sqlx::query("DELETE FROM tasks WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id.as_uuid())
            .bind(id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error(OP, e))?;
        Ok(result.rows_affected() > 0)
    }
}
