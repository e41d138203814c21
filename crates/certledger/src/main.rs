//! certledger - inspect and feed a certificate ledger
//!
//! Usage:
//!     certledger --db ledger.db init
//!     certledger --db ledger.db recent
//!     certledger --db ledger.db show 0042
//!     certledger --db ledger.db import certificates.json

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use certledger::{commands, tracing::prefix};
use certledger_core::Context;
use certledger_sqlite::LedgerConfig;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "certledger")]
#[command(about = "Inspect and feed a certificate ledger")]
#[command(version)]
struct Args {
    /// Ledger database file
    #[arg(long, env = "CERTLEDGER_DB")]
    db: PathBuf,

    /// Default log filter when RUST_LOG is unset (debug, info, warn, error)
    #[arg(long, env = "CERTLEDGER_LOG", default_value = "info")]
    log_level: String,

    /// Milliseconds to wait on a locked database
    #[arg(long, default_value = "5000")]
    busy_timeout_ms: u64,

    /// Abort the command after this many milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create or migrate the ledger
    Init,
    /// Print the most recent certificates as JSON, newest first
    Recent {
        /// Number of certificates (defaults to the standard window of 20)
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Print one certificate as JSON
    Show {
        /// Certificate id
        id: String,
    },
    /// Persist certificates from a JSON array file in one transaction
    Import {
        /// JSON file with an array of certificates
        file: PathBuf,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();
    certledger::tracing::init_with_filter(&args.log_level);

    info!("{} certledger v{}", prefix::OPEN, env!("CARGO_PKG_VERSION"));

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> certledger::Result<()> {
    let config = LedgerConfig::file(&args.db).busy_timeout(Duration::from_millis(args.busy_timeout_ms));
    let ctx = match args.timeout_ms {
        Some(ms) => Context::with_timeout(Duration::from_millis(ms)),
        None => Context::background(),
    };

    match args.command {
        Command::Init => {
            commands::init(&config, &ctx)?;
        }
        Command::Recent { limit } => {
            let records = commands::recent(&config, &ctx, limit)?;
            print_json(&records)?;
        }
        Command::Show { id } => {
            let record = commands::show(&config, &ctx, &id)?;
            print_json(&record)?;
        }
        Command::Import { file } => {
            let json = std::fs::read_to_string(&file)?;
            let records = commands::parse_records(&json)?;
            commands::import(&config, &ctx, &records)?;
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> certledger::Result<()> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}
