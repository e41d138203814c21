//! Common error types for certledger components.

use certledger_core::{RecordError, StoreError};
use certledger_sqlite::SqliteError;
use thiserror::Error;

/// Common error type for certledger operations.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Opening or migrating the ledger failed
    #[error("ledger setup error: {0}")]
    Setup(#[from] SqliteError),

    /// A store operation failed
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// An invalid certificate record
    #[error("invalid certificate: {0}")]
    Record(#[from] RecordError),

    /// Transaction begin/commit failed
    #[error("transaction error: {0}")]
    Transaction(#[from] certledger_sqlite::rusqlite::Error),

    /// Requested certificate is not in the ledger
    #[error("certificate not found: {0}")]
    NotFound(String),
}

/// Result type alias using certledger Error.
pub type Result<T> = std::result::Result<T, Error>;
