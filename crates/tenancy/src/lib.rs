//! `shoploom-tenancy` — per-business data isolation.
//!
//! This crate is the sole security boundary between tenants: a pure
//! filter/stamp/assert layer applied identically to every tenant-owned
//! entity type on every read and write. A single omitted call is a full
//! tenant data leak, so route handlers go through these functions rather
//! than touching `tenant_id` fields themselves.
//!
//! No state, no IO, no locking; safe for unlimited read concurrency.

pub mod scope;

pub use scope::{TenantScoped, TenantStamped, assert_same_tenant, scope, stamp, tenant_of};
