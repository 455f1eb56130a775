//! `shoploom-infra` — storage for the domain crates.
//!
//! The store traits here are the persistence seam the API layer talks to:
//! tenant-filtered reads, tenant-stamped writes, and the one genuinely
//! transactional operation in the system, the stock change, which must
//! update a product's quantity and append its ledger entry as a single
//! indivisible unit.
//!
//! Two implementations: [`store::InMemoryStore`] for tests/dev, and
//! [`store::PostgresStore`] for production.

pub mod error;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use store::{
    AccountStore, CatalogStore, CustomerStore, InMemoryStore, InventoryStore, PostgresStore,
    StockOutcome, TailoringStore,
};
