//! Storage error types

use thiserror::Error;

use crate::context::CancelReason;

/// Errors that can occur during storage operations.
///
/// Stores return every failure to the caller as-is: nothing is retried,
/// committed or rolled back on the caller's behalf.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Transport or connection failure (cannot open, busy, locked, I/O)
    #[error("storage connectivity error: {0}")]
    Connectivity(String),

    /// A certificate with this id is already persisted
    #[error("certificate already exists: {0}")]
    ConstraintViolation(String),

    /// Malformed statement or engine-side failure
    #[error("query error: {0}")]
    Query(String),

    /// A stored row could not be converted into a certificate
    #[error("decode error: {0}")]
    Decode(String),

    /// The caller's context was canceled or expired
    #[error("context {0}")]
    ContextCanceled(CancelReason),
}

impl StoreError {
    /// True for failures caused by the caller's context rather than the store.
    pub fn is_canceled(&self) -> bool {
        matches!(self, StoreError::ContextCanceled(_))
    }
}

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;
