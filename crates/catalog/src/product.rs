use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shoploom_core::{CategoryId, DomainError, DomainResult, Entity, ProductId, TenantId};
use shoploom_tenancy::{TenantScoped, TenantStamped};

/// Threshold applied when a product is created without one.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 10;

/// Creation payload for a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category_id: Option<CategoryId>,
    pub price_cents: i64,
    pub low_stock_threshold: Option<i64>,
    #[serde(default)]
    pub sku: String,
}

/// Partial update for a product. Quantity is deliberately absent: stock only
/// moves through the inventory ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<Option<CategoryId>>,
    pub price_cents: Option<i64>,
    pub low_stock_threshold: Option<i64>,
    pub sku: Option<String>,
}

/// A product in one business's inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    tenant_id: TenantId,
    category_id: Option<CategoryId>,
    name: String,
    description: String,
    /// Price in the smallest currency unit.
    price_cents: i64,
    /// Current stock. Never negative; mutated only by the inventory ledger.
    quantity: i64,
    low_stock_threshold: i64,
    sku: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Product {
    /// Create a product with zero stock.
    pub fn create(
        id: ProductId,
        tenant_id: TenantId,
        new: NewProduct,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if new.name.trim().is_empty() {
            return Err(DomainError::validation("product name cannot be empty"));
        }
        if new.price_cents < 0 {
            return Err(DomainError::validation("price cannot be negative"));
        }
        let low_stock_threshold = new.low_stock_threshold.unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD);
        if low_stock_threshold < 0 {
            return Err(DomainError::validation(
                "low stock threshold cannot be negative",
            ));
        }

        Ok(Self {
            id,
            tenant_id,
            category_id: new.category_id,
            name: new.name,
            description: new.description,
            price_cents: new.price_cents,
            quantity: 0,
            low_stock_threshold,
            sku: new.sku,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn category_id(&self) -> Option<CategoryId> {
        self.category_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn price_cents(&self) -> i64 {
        self.price_cents
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn low_stock_threshold(&self) -> i64 {
        self.low_stock_threshold
    }

    pub fn sku(&self) -> &str {
        &self.sku
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Stock at or below the per-product threshold.
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.low_stock_threshold
    }

    pub fn is_out_of_stock(&self) -> bool {
        self.quantity == 0
    }

    pub fn apply_patch(&mut self, patch: ProductPatch, now: DateTime<Utc>) -> DomainResult<()> {
        if let Some(name) = patch.name {
            if name.trim().is_empty() {
                return Err(DomainError::validation("product name cannot be empty"));
            }
            self.name = name;
        }
        if let Some(price_cents) = patch.price_cents {
            if price_cents < 0 {
                return Err(DomainError::validation("price cannot be negative"));
            }
            self.price_cents = price_cents;
        }
        if let Some(threshold) = patch.low_stock_threshold {
            if threshold < 0 {
                return Err(DomainError::validation(
                    "low stock threshold cannot be negative",
                ));
            }
            self.low_stock_threshold = threshold;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(category_id) = patch.category_id {
            self.category_id = category_id;
        }
        if let Some(sku) = patch.sku {
            self.sku = sku;
        }
        self.updated_at = now;
        Ok(())
    }

    /// Record the outcome of an accepted ledger change.
    ///
    /// The inventory ledger is the only caller; nothing else writes
    /// `quantity`. The new value has already been validated non-negative by
    /// the ledger decision.
    pub fn apply_stock(&mut self, new_quantity: i64, now: DateTime<Utc>) {
        debug_assert!(new_quantity >= 0);
        self.quantity = new_quantity;
        self.updated_at = now;
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl TenantScoped for Product {
    fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }
}

impl TenantStamped for Product {
    fn set_tenant_id(&mut self, tenant_id: TenantId) {
        self.tenant_id = tenant_id;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_product() -> NewProduct {
        NewProduct {
            name: "Kente Cloth".to_string(),
            description: String::new(),
            category_id: None,
            price_cents: 15_000,
            low_stock_threshold: None,
            sku: "KC-001".to_string(),
        }
    }

    fn product() -> Product {
        Product::create(ProductId::new(), TenantId::new(), new_product(), Utc::now()).unwrap()
    }

    #[test]
    fn new_product_starts_out_of_stock_with_default_threshold() {
        let p = product();
        assert_eq!(p.quantity(), 0);
        assert_eq!(p.low_stock_threshold(), DEFAULT_LOW_STOCK_THRESHOLD);
        assert!(p.is_out_of_stock());
        assert!(p.is_low_stock());
    }

    #[test]
    fn create_rejects_negative_price() {
        let mut new = new_product();
        new.price_cents = -1;
        let err =
            Product::create(ProductId::new(), TenantId::new(), new, Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn low_stock_tracks_threshold_boundary() {
        let mut p = product();
        p.apply_stock(10, Utc::now());
        assert!(p.is_low_stock());
        assert!(!p.is_out_of_stock());

        p.apply_stock(11, Utc::now());
        assert!(!p.is_low_stock());
    }

    #[test]
    fn patch_never_touches_quantity() {
        let mut p = product();
        p.apply_stock(7, Utc::now());

        let patch = ProductPatch {
            name: Some("Kente Cloth (wide)".to_string()),
            price_cents: Some(18_000),
            ..ProductPatch::default()
        };
        p.apply_patch(patch, Utc::now()).unwrap();

        assert_eq!(p.quantity(), 7);
        assert_eq!(p.price_cents(), 18_000);
    }

    #[test]
    fn patch_rejects_negative_threshold() {
        let mut p = product();
        let patch = ProductPatch {
            low_stock_threshold: Some(-3),
            ..ProductPatch::default()
        };
        assert!(p.apply_patch(patch, Utc::now()).is_err());
    }
}
