//! `shoploom-inventory` — the stock ledger.
//!
//! The only sanctioned path for mutating a product's quantity. Every
//! accepted change pairs the new quantity with exactly one immutable
//! [`LedgerEntry`]; the decision here is pure, and the storage layer commits
//! both sides as one unit so quantity and audit trail never diverge.

pub mod ledger;

pub use ledger::{apply_change, ChangeType, LedgerEntry, StockChange};
