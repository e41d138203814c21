//! certledger core
//!
//! Backend-agnostic pieces of the certificate ledger: the record that an
//! aggregator persists once a signing round has been sealed, the cancellation
//! context every store call honors, the error taxonomy, and the
//! `CertificateStore` contract implemented by each storage backend.
//!
//! Stores never own a database handle. Every call receives the caller's
//! transaction, and committing or rolling it back stays with the caller.
//!
//! # Example
//!
//! ```rust
//! use certledger_core::{CertificateBuilder, CertificateStore, Context, MemoryLedger, MemoryStore};
//! use chrono::{TimeZone, Utc};
//!
//! let ledger = MemoryLedger::new();
//! let store = MemoryStore::new();
//! let ctx = Context::background();
//!
//! let record = CertificateBuilder::new()
//!     .id("0001")
//!     .block_number(42)
//!     .block_hash("blockhash-42")
//!     .merkle_root("merkle-42")
//!     .multi_sig(vec![0xde, 0xad])
//!     .signed_between(
//!         Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
//!         Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 5).unwrap(),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let tx = ledger.begin();
//! store.persist(&ctx, &tx, &record).unwrap();
//! tx.commit();
//!
//! let tx = ledger.begin();
//! let recent = store.list_recent(&ctx, &tx).unwrap();
//! assert_eq!(recent, vec![record]);
//! ```

pub mod context;
pub mod record;
pub mod storage;

// Re-export main types at crate root
pub use context::{CancelReason, Canceler, Context};
pub use record::{CertificateBuilder, CertificateRecord, RecordError};
pub use storage::{
    CertificateStore, MemoryLedger, MemoryStore, MemoryTx, StoreError, StoreResult, RECENT_WINDOW,
};
