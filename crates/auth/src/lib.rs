//! `shoploom-auth` — authentication boundary.
//!
//! This crate resolves "who is acting" for a request: JWT claims validation
//! and the [`Principal`] passed explicitly into every scoped operation. It is
//! intentionally decoupled from HTTP and storage; token *issuance* (and
//! password handling) lives with the identity provider, not here.

pub mod claims;
pub mod principal;

pub use claims::{Claims, Hs256JwtValidator, JwtValidator, TokenValidationError, validate_claims};
pub use principal::Principal;
