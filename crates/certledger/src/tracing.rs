//! Logging setup for the certledger binary, plus segment prefixes used in
//! ledger messages.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global subscriber: an `EnvFilter` and a compact fmt layer.
///
/// `default_filter` applies only when `RUST_LOG` is unset. Output goes to
/// stderr; stdout carries the JSON results.
pub fn init_with_filter(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

/// certledger segment prefixes for logging.
pub mod prefix {
    /// Ledger database operations prefix
    pub const DB: &str = "⊔";
    /// Startup prefix
    pub const OPEN: &str = "✿";
}
