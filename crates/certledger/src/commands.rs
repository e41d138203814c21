//! Ledger commands behind the `certledger` binary
//!
//! Each command opens its own connection and owns the transaction boundary;
//! the store only ever sees the transaction.

use certledger_core::{CertificateRecord, CertificateStore, Context};
use certledger_sqlite::LedgerConfig;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::tracing::prefix;

/// Create the ledger (or migrate an existing one) and report how many
/// certificates it holds.
pub fn init(config: &LedgerConfig, ctx: &Context) -> Result<usize> {
    let mut conn = config.connect()?;
    let tx = conn.transaction()?;
    let count = config.store().count(ctx, &tx)?;
    info!("{} ledger ready with {} certificates", prefix::DB, count);
    Ok(count)
}

/// Newest certificates, newest first. Without a limit this is the standard
/// recency window.
pub fn recent(
    config: &LedgerConfig,
    ctx: &Context,
    limit: Option<usize>,
) -> Result<Vec<CertificateRecord>> {
    let mut conn = config.connect()?;
    let store = config.store();
    let tx = conn.transaction()?;
    let records = match limit {
        Some(limit) => store.list_latest(ctx, &tx, limit)?,
        None => store.list_recent(ctx, &tx)?,
    };
    debug!("{} read {} certificates", prefix::DB, records.len());
    Ok(records)
}

/// One certificate by id.
pub fn show(config: &LedgerConfig, ctx: &Context, id: &str) -> Result<CertificateRecord> {
    let mut conn = config.connect()?;
    let tx = conn.transaction()?;
    config
        .store()
        .get(ctx, &tx, id)?
        .ok_or_else(|| Error::NotFound(id.to_string()))
}

/// Persist certificates in a single transaction.
///
/// Either every record is committed or none is: the first failure drops the
/// transaction, which rolls it back.
pub fn import(
    config: &LedgerConfig,
    ctx: &Context,
    records: &[CertificateRecord],
) -> Result<usize> {
    for record in records {
        record.validate()?;
    }

    let mut conn = config.connect()?;
    let store = config.store();
    let tx = conn.transaction()?;
    for record in records {
        store.persist(ctx, &tx, record)?;
    }
    tx.commit()?;

    info!("{} imported {} certificates", prefix::DB, records.len());
    Ok(records.len())
}

/// Parse a JSON array of certificates.
pub fn parse_records(json: &str) -> Result<Vec<CertificateRecord>> {
    Ok(serde_json::from_str(json)?)
}
