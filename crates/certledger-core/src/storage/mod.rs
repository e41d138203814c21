//! Storage abstraction for certificates
//!
//! This module defines the `CertificateStore` trait that abstracts over
//! transactional storage backends. Implementations exist for:
//!
//! - **Memory**: In-memory ledger with explicit transactions (`MemoryLedger`)
//! - **SQLite**: Native SQLite via rusqlite (separate crate)
//!
//! The ledger is append-only. Backends expose inserts and reads, never
//! updates or deletes.

mod error;
mod memory;
mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::{MemoryLedger, MemoryStore, MemoryTx};
pub use traits::{CertificateStore, RECENT_WINDOW};
