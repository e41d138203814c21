//! Ledger database configuration
//!
//! Describes where the ledger lives and how connections to it behave.
//! Opening a connection applies pragmas and pending migrations; the
//! resulting connection is handed to the caller, who opens transactions on
//! it and passes them to [`SqliteCertificateStore`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::Connection;
use tracing::debug;

use crate::error::{Result, SqliteError};
use crate::store::SqliteCertificateStore;

/// Ledger database configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Database file, or `None` for a private in-memory database
    pub path: Option<PathBuf>,
    /// How long a statement waits on a locked database before failing
    pub busy_timeout: Duration,
    /// SQLite VM instructions between cancellation checks
    pub cancel_check_ops: i32,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            path: None,
            busy_timeout: Duration::from_secs(5),
            cancel_check_ops: 1000,
        }
    }
}

impl LedgerConfig {
    /// In-memory ledger (for testing)
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// File-backed ledger
    pub fn file(path: impl AsRef<Path>) -> Self {
        Self {
            path: Some(path.as_ref().to_path_buf()),
            ..Self::default()
        }
    }

    pub fn busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.busy_timeout = busy_timeout;
        self
    }

    pub fn cancel_check_ops(mut self, ops: i32) -> Self {
        self.cancel_check_ops = ops;
        self
    }

    /// Reject values SQLite would silently misinterpret.
    pub fn validate(&self) -> Result<()> {
        if self.cancel_check_ops <= 0 {
            return Err(SqliteError::Config(format!(
                "cancel_check_ops must be positive, got {}",
                self.cancel_check_ops
            )));
        }
        Ok(())
    }

    /// Open a connection with pragmas and migrations applied.
    pub fn connect(&self) -> Result<Connection> {
        self.validate()?;

        let conn = match &self.path {
            Some(path) => {
                debug!(path = %path.display(), "opening certificate ledger");
                Connection::open(path)?
            }
            None => {
                debug!("opening in-memory certificate ledger");
                Connection::open_in_memory()?
            }
        };
        conn.busy_timeout(self.busy_timeout)?;
        crate::migrate::migrate(&conn)?;
        Ok(conn)
    }

    /// Store operating with this configuration.
    pub fn store(&self) -> SqliteCertificateStore {
        SqliteCertificateStore::new().cancel_check_ops(self.cancel_check_ops)
    }
}
