//! # certledger
//!
//! Shared infrastructure for certledger binaries:
//! - **commands**: ledger operations run inside command-owned transactions
//! - **error**: Common error type wrapping the store and setup errors
//! - **tracing**: Logging setup and segment prefixes
//!
//! ## Usage
//!
//! ```rust,no_run
//! use certledger::commands;
//! use certledger_core::Context;
//! use certledger_sqlite::LedgerConfig;
//!
//! # fn main() -> certledger::Result<()> {
//! let config = LedgerConfig::file("ledger.db");
//! let recent = commands::recent(&config, &Context::background(), None)?;
//! println!("{} certificates", recent.len());
//! # Ok(())
//! # }
//! ```

pub mod commands;
pub mod error;
pub mod tracing;

pub use error::{Error, Result};
