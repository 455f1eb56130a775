//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// invariants, conflicts). Infrastructure concerns belong elsewhere. Every
/// variant is local, synchronous and non-retryable; a rejected operation
/// leaves all durable state unchanged.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// No authenticated principal on a path that requires one.
    #[error("unauthenticated")]
    Unauthenticated,

    /// The principal has no associated business. Reads treat this as an
    /// empty result set; writes surface it as this error.
    #[error("principal has no business")]
    NoTenant,

    /// A write referenced an entity owned by a different business.
    #[error("referenced entity belongs to a different business")]
    CrossTenantReference,

    /// A stock change would drive a product's quantity negative.
    #[error("insufficient stock (available {available}, requested {requested})")]
    InsufficientStock { available: i64, requested: i64 },

    /// An unrecognized task status label.
    #[error("invalid task status: {0}")]
    InvalidStatus(String),

    /// An unrecognized inventory change type.
    #[error("invalid inventory change type: {0}")]
    InvalidChangeType(String),

    /// A non-positive quantity in a stock-change request.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A requested resource was not found (domain-level).
    #[error("not found")]
    NotFound,

    /// A conflict occurred (uniqueness violation, repeated assignment).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The principal is authenticated but not permitted to do this.
    #[error("forbidden")]
    Forbidden,
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }
}
