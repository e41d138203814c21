//! SQLite storage backend for the certificate ledger
//!
//! This crate provides a persistent SQLite implementation of the
//! certledger-core `CertificateStore` trait.
//!
//! # Features
//!
//! - `SqliteCertificateStore` runs every operation inside a caller-owned
//!   `rusqlite::Transaction`; it never commits or rolls back
//! - Embedded schema applied by [`migrate::migrate`]
//! - Cancellation and deadlines honored while statements run, through a
//!   SQLite progress handler
//! - SQLite failures classified into the `StoreError` taxonomy
//!
//! # Example
//!
//! ```rust,no_run
//! use certledger_core::{CertificateBuilder, CertificateStore, Context};
//! use certledger_sqlite::LedgerConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = LedgerConfig::file("ledger.db");
//! let mut conn = config.connect()?;
//! let store = config.store();
//! let ctx = Context::background();
//!
//! let record = CertificateBuilder::new()
//!     .id("0001")
//!     .block_number(42)
//!     .block_hash("blockhash-42")
//!     .merkle_root("merkle-42")
//!     .multi_sig(vec![0xde, 0xad])
//!     .build()?;
//!
//! // The caller owns the transaction boundary
//! let tx = conn.transaction()?;
//! store.persist(&ctx, &tx, &record)?;
//! tx.commit()?;
//!
//! let tx = conn.transaction()?;
//! let recent = store.list_recent(&ctx, &tx)?;
//! assert_eq!(recent.len(), 1);
//! # Ok(())
//! # }
//! ```

mod cancel;
pub mod codec;
pub mod config;
pub mod error;
pub mod migrate;
pub mod store;

// Re-export main types
pub use config::LedgerConfig;
pub use error::{Result, SqliteError};
pub use store::SqliteCertificateStore;

// Callers own transactions, so they need the same rusqlite version
pub use rusqlite;
