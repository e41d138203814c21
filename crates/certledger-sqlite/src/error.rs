//! Error types for SQLite storage backend

use std::fmt;

use certledger_core::{CancelReason, Context, StoreError};
use rusqlite::{ffi, ErrorCode};
use thiserror::Error;

/// Result type for setup operations (open, configure, migrate)
pub type Result<T> = std::result::Result<T, SqliteError>;

/// Errors that can occur while opening and preparing a ledger database
#[derive(Debug, Error)]
pub enum SqliteError {
    /// Database connection or statement error
    #[error("SQLite error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(String),

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convert SqliteError to StoreError for the storage trait
impl From<SqliteError> for StoreError {
    fn from(err: SqliteError) -> Self {
        match err {
            SqliteError::Database(e) => StoreError::Connectivity(format!("SQLite: {}", e)),
            SqliteError::Migration(msg) => StoreError::Query(format!("Migration: {}", msg)),
            SqliteError::Config(msg) => StoreError::Query(format!("Configuration: {}", msg)),
        }
    }
}

/// Store operation a failure is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Operation {
    Persist,
    ListLatest,
    Get,
    Count,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Persist => f.write_str("persist"),
            Operation::ListLatest => f.write_str("list latest"),
            Operation::Get => f.write_str("get"),
            Operation::Count => f.write_str("count"),
        }
    }
}

/// Map a rusqlite failure onto the store error taxonomy.
///
/// An interrupted statement is reported as `ContextCanceled` with the
/// context's own reason; the progress handler is the only thing that
/// interrupts our statements.
pub(crate) fn classify(
    ctx: &Context,
    op: Operation,
    id: Option<&str>,
    err: rusqlite::Error,
) -> StoreError {
    let subject = match id {
        Some(id) => format!("{} {}", op, id),
        None => op.to_string(),
    };

    match &err {
        rusqlite::Error::SqliteFailure(failure, _) => match failure.code {
            ErrorCode::OperationInterrupted => {
                StoreError::ContextCanceled(ctx.err().unwrap_or(CancelReason::Canceled))
            }
            ErrorCode::ConstraintViolation
                if matches!(
                    failure.extended_code,
                    ffi::SQLITE_CONSTRAINT_PRIMARYKEY | ffi::SQLITE_CONSTRAINT_UNIQUE
                ) =>
            {
                StoreError::ConstraintViolation(id.unwrap_or_default().to_string())
            }
            ErrorCode::CannotOpen
            | ErrorCode::DatabaseBusy
            | ErrorCode::DatabaseLocked
            | ErrorCode::SystemIoFailure
            | ErrorCode::NotADatabase
            | ErrorCode::PermissionDenied
            | ErrorCode::ReadOnly => StoreError::Connectivity(format!("{}: {}", subject, err)),
            _ => StoreError::Query(format!("{}: {}", subject, err)),
        },
        rusqlite::Error::FromSqlConversionFailure(..)
        | rusqlite::Error::InvalidColumnType(..)
        | rusqlite::Error::IntegralValueOutOfRange(..) => {
            StoreError::Decode(format!("{}: {}", subject, err))
        }
        _ => StoreError::Query(format!("{}: {}", subject, err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::types::Type;

    fn failure(code: std::os::raw::c_int) -> rusqlite::Error {
        rusqlite::Error::SqliteFailure(ffi::Error::new(code), None)
    }

    #[test]
    fn test_primary_key_violation() {
        let ctx = Context::background();
        let err = classify(
            &ctx,
            Operation::Persist,
            Some("A"),
            failure(ffi::SQLITE_CONSTRAINT_PRIMARYKEY),
        );
        assert_eq!(err, StoreError::ConstraintViolation("A".to_string()));
    }

    #[test]
    fn test_not_null_violation_is_query_error() {
        let ctx = Context::background();
        let err = classify(
            &ctx,
            Operation::Persist,
            Some("A"),
            failure(ffi::SQLITE_CONSTRAINT_NOTNULL),
        );
        assert!(matches!(err, StoreError::Query(_)));
    }

    #[test]
    fn test_busy_is_connectivity() {
        let ctx = Context::background();
        let err = classify(&ctx, Operation::Persist, Some("A"), failure(ffi::SQLITE_BUSY));
        match err {
            StoreError::Connectivity(msg) => assert!(msg.starts_with("persist A")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_interrupt_uses_context_reason() {
        let ctx = Context::background().deadline(std::time::Instant::now());
        let err = classify(&ctx, Operation::ListLatest, None, failure(ffi::SQLITE_INTERRUPT));
        assert_eq!(
            err,
            StoreError::ContextCanceled(CancelReason::DeadlineExceeded)
        );
    }

    #[test]
    fn test_column_type_is_decode() {
        let ctx = Context::background();
        let err = classify(
            &ctx,
            Operation::ListLatest,
            None,
            rusqlite::Error::InvalidColumnType(4, "multi_sig".to_string(), Type::Text),
        );
        assert!(matches!(err, StoreError::Decode(_)));
    }

    #[test]
    fn test_setup_error_converts() {
        let err: StoreError = SqliteError::Migration("boom".to_string()).into();
        assert_eq!(err, StoreError::Query("Migration: boom".to_string()));
    }
}
