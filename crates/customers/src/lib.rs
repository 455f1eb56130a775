//! `shoploom-customers` — customer records shared by every industry.

pub mod customer;

pub use customer::{Customer, CustomerPatch, NewCustomer};
