//! `shoploom-accounts` — tenants and the people who run them.
//!
//! A [`Business`] is a tenant: the isolation boundary every other entity in
//! the system partitions by. A [`User`] is the identity behind a principal,
//! belonging to at most one business for its whole life. [`Industry`] is
//! global reference data selected at registration.

pub mod business;
pub mod industry;
pub mod user;

pub use business::Business;
pub use industry::Industry;
pub use user::User;
