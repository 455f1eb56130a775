//! Store operation errors.

use thiserror::Error;

use shoploom_core::DomainError;

pub type StoreResult<T> = Result<T, StoreError>;

/// Error surfaced by a store operation.
///
/// Domain failures (not found, conflicts, rejected stock changes) pass
/// through unchanged so callers can map them precisely; backend failures
/// (pool, network, serialization) are opaque strings that never leak driver
/// details beyond the log line.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("storage backend failure in {operation}: {message}")]
    Backend {
        operation: &'static str,
        message: String,
    },
}

impl StoreError {
    pub fn backend(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Backend {
            operation,
            message: message.into(),
        }
    }

    /// The domain error inside, if this is one.
    pub fn as_domain(&self) -> Option<&DomainError> {
        match self {
            StoreError::Domain(e) => Some(e),
            StoreError::Backend { .. } => None,
        }
    }
}
