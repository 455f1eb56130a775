use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shoploom_catalog::Product;
use shoploom_core::{DomainError, DomainResult, Entity, LedgerEntryId, ProductId, TenantId, UserId};
use shoploom_tenancy::TenantScoped;

/// Kind of stock movement.
///
/// `Restock` and `Return` add stock; `Sale` and `Adjustment` remove it.
/// Note that `Adjustment` always subtracts: a correction that *adds* stock
/// (found inventory) cannot be expressed and has to be recorded as a
/// `Restock`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeType {
    Restock,
    Sale,
    Adjustment,
    Return,
}

impl ChangeType {
    pub const ALL: [ChangeType; 4] = [
        ChangeType::Restock,
        ChangeType::Sale,
        ChangeType::Adjustment,
        ChangeType::Return,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeType::Restock => "RESTOCK",
            ChangeType::Sale => "SALE",
            ChangeType::Adjustment => "ADJUSTMENT",
            ChangeType::Return => "RETURN",
        }
    }

    /// Apply the sign rule to a (positive) requested quantity.
    pub fn signed_delta(&self, quantity: i64) -> i64 {
        match self {
            ChangeType::Restock | ChangeType::Return => quantity,
            ChangeType::Sale | ChangeType::Adjustment => -quantity,
        }
    }
}

impl core::fmt::Display for ChangeType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChangeType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RESTOCK" => Ok(ChangeType::Restock),
            "SALE" => Ok(ChangeType::Sale),
            "ADJUSTMENT" => Ok(ChangeType::Adjustment),
            "RETURN" => Ok(ChangeType::Return),
            other => Err(DomainError::InvalidChangeType(other.to_string())),
        }
    }
}

/// One immutable line of the stock audit trail.
///
/// Append-only: once created an entry is never mutated or deleted. The
/// `before`/`delta`/`after` triple always satisfies `after = before + delta`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    id: LedgerEntryId,
    tenant_id: TenantId,
    product_id: ProductId,
    /// Who made the change.
    actor: UserId,
    change_type: ChangeType,
    delta: i64,
    before: i64,
    after: i64,
    notes: String,
    occurred_at: DateTime<Utc>,
}

impl LedgerEntry {
    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn actor(&self) -> UserId {
        self.actor
    }

    pub fn change_type(&self) -> ChangeType {
        self.change_type
    }

    pub fn delta(&self) -> i64 {
        self.delta
    }

    pub fn before(&self) -> i64 {
        self.before
    }

    pub fn after(&self) -> i64 {
        self.after
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}

impl Entity for LedgerEntry {
    type Id = LedgerEntryId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl TenantScoped for LedgerEntry {
    fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }
}

/// Outcome of an accepted stock change: the quantity the product must be
/// updated to, and the single ledger entry to append. The storage layer
/// persists both as one indivisible unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockChange {
    pub new_quantity: i64,
    pub entry: LedgerEntry,
}

/// Decide a stock change against the product's current quantity.
///
/// Pure: no side effects, no IO. `quantity` is the requested magnitude and
/// must be positive; the sign comes from `change_type`. A change that would
/// drive the quantity negative is rejected whole, with no entry and no update.
pub fn apply_change(
    product: &Product,
    change_type: ChangeType,
    quantity: i64,
    actor: UserId,
    notes: impl Into<String>,
    entry_id: LedgerEntryId,
    occurred_at: DateTime<Utc>,
) -> DomainResult<StockChange> {
    if quantity <= 0 {
        return Err(DomainError::InvalidQuantity(quantity));
    }

    let before = product.quantity();
    let delta = change_type.signed_delta(quantity);
    let after = before + delta;

    if after < 0 {
        return Err(DomainError::InsufficientStock {
            available: before,
            requested: quantity,
        });
    }

    Ok(StockChange {
        new_quantity: after,
        entry: LedgerEntry {
            id: entry_id,
            tenant_id: product.tenant_id(),
            product_id: *product.id(),
            actor,
            change_type,
            delta,
            before,
            after,
            notes: notes.into(),
            occurred_at,
        },
    })
}
