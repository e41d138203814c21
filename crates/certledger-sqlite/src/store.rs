//! SQLite storage backend implementing the CertificateStore trait

use certledger_core::{CertificateRecord, CertificateStore, Context, StoreError, StoreResult};
use rusqlite::{OptionalExtension, Transaction};
use tracing::{debug, warn};

use crate::cancel::CancelGuard;
use crate::codec::{block_number_to_sql, decode_row, timestamp_to_sql, COLUMNS};
use crate::error::{classify, Operation};

const INSERT_CERTIFICATE: &str = "INSERT INTO certificate_ledger \
     (id, block_number, block_hash, merkle_root, multi_sig, sig_started_at, sig_finished_at) \
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)";

/// SQLite-backed certificate store.
///
/// Holds no connection: each call runs inside the `rusqlite::Transaction`
/// the caller passes in, and the caller decides whether to commit it.
/// Concurrent writers are serialized by SQLite itself; duplicate ids are
/// rejected by the primary key.
///
/// Every call installs a progress handler on the transaction's connection
/// for cancellation and clears it on return. A progress handler the caller
/// registered on that connection is removed by any store call and must be
/// installed again afterwards.
#[derive(Debug, Clone, Copy)]
pub struct SqliteCertificateStore {
    cancel_check_ops: i32,
}

impl Default for SqliteCertificateStore {
    fn default() -> Self {
        Self {
            cancel_check_ops: 1000,
        }
    }
}

impl SqliteCertificateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// SQLite VM instructions between cancellation checks while a statement runs.
    ///
    /// Non-positive values are clamped to 1.
    pub fn cancel_check_ops(mut self, ops: i32) -> Self {
        self.cancel_check_ops = ops.max(1);
        self
    }
}

impl CertificateStore for SqliteCertificateStore {
    type Tx<'conn> = Transaction<'conn>;

    fn persist(
        &self,
        ctx: &Context,
        tx: &Transaction<'_>,
        record: &CertificateRecord,
    ) -> StoreResult<()> {
        ctx.check()?;

        let block_number = block_number_to_sql(record.block_number).ok_or_else(|| {
            StoreError::Query(format!(
                "persist {}: block number {} exceeds INTEGER range",
                record.id, record.block_number
            ))
        })?;

        let _guard = CancelGuard::install(tx, ctx, self.cancel_check_ops);
        debug!(id = %record.id, block_number = record.block_number, "persisting certificate");

        tx.execute(
            INSERT_CERTIFICATE,
            rusqlite::params![
                record.id,
                block_number,
                record.block_hash,
                record.merkle_root,
                record.multi_sig,
                timestamp_to_sql(&record.sig_started_at),
                timestamp_to_sql(&record.sig_finished_at),
            ],
        )
        .map_err(|e| {
            let err = classify(ctx, Operation::Persist, Some(&record.id), e);
            warn!(id = %record.id, error = %err, "persist failed");
            err
        })?;

        Ok(())
    }

    fn list_latest(
        &self,
        ctx: &Context,
        tx: &Transaction<'_>,
        limit: usize,
    ) -> StoreResult<Vec<CertificateRecord>> {
        ctx.check()?;

        // Declared first so it is removed after the statement and cursor.
        let _guard = CancelGuard::install(tx, ctx, self.cancel_check_ops);
        let fail = |e: rusqlite::Error| {
            let err = classify(ctx, Operation::ListLatest, None, e);
            warn!(limit, error = %err, "list latest failed");
            err
        };

        let mut stmt = tx
            .prepare(&format!(
                "SELECT {} FROM certificate_ledger ORDER BY id DESC LIMIT ?1",
                COLUMNS
            ))
            .map_err(fail)?;
        let sql_limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut rows = stmt.query([sql_limit]).map_err(fail)?;

        let mut records = Vec::new();
        while let Some(row) = rows.next().map_err(fail)? {
            ctx.check()?;
            records.push(decode_row(row)?);
        }

        debug!(limit, returned = records.len(), "listed latest certificates");
        Ok(records)
    }

    fn get(
        &self,
        ctx: &Context,
        tx: &Transaction<'_>,
        id: &str,
    ) -> StoreResult<Option<CertificateRecord>> {
        ctx.check()?;

        let _guard = CancelGuard::install(tx, ctx, self.cancel_check_ops);
        let mut stmt = tx
            .prepare(&format!(
                "SELECT {} FROM certificate_ledger WHERE id = ?1",
                COLUMNS
            ))
            .map_err(|e| classify(ctx, Operation::Get, Some(id), e))?;

        let row = stmt
            .query_row([id], |row| Ok(decode_row(row)))
            .optional()
            .map_err(|e| classify(ctx, Operation::Get, Some(id), e))?;

        row.transpose()
    }

    fn count(&self, ctx: &Context, tx: &Transaction<'_>) -> StoreResult<usize> {
        ctx.check()?;

        let _guard = CancelGuard::install(tx, ctx, self.cancel_check_ops);
        let count: i64 = tx
            .query_row("SELECT COUNT(*) FROM certificate_ledger", [], |row| {
                row.get(0)
            })
            .map_err(|e| classify(ctx, Operation::Count, None, e))?;

        usize::try_from(count).map_err(|_| StoreError::Decode(format!("count: {}", count)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LedgerConfig;
    use certledger_core::CertificateBuilder;
    use chrono::{TimeZone, Utc};

    fn certificate(id: &str) -> CertificateRecord {
        CertificateBuilder::new()
            .id(id)
            .block_number(10)
            .block_hash("bh")
            .merkle_root("mr")
            .multi_sig(vec![9, 9])
            .sig_started_at(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
            .build()
            .unwrap()
    }

    #[test]
    fn test_cancel_check_ops_clamped() {
        let store = SqliteCertificateStore::new().cancel_check_ops(-5);
        assert_eq!(store.cancel_check_ops, 1);
    }

    #[test]
    fn test_oversized_block_number_is_rejected() {
        let mut conn = LedgerConfig::in_memory().connect().unwrap();
        let store = SqliteCertificateStore::new();
        let ctx = Context::background();

        let mut record = certificate("0001");
        record.block_number = u64::MAX;

        let tx = conn.transaction().unwrap();
        let err = store.persist(&ctx, &tx, &record).unwrap_err();
        assert!(matches!(err, StoreError::Query(ref msg) if msg.contains("0001")));
        assert_eq!(store.count(&ctx, &tx).unwrap(), 0);
    }

    #[test]
    fn test_persist_does_not_commit() {
        let mut conn = LedgerConfig::in_memory().connect().unwrap();
        let store = SqliteCertificateStore::new();
        let ctx = Context::background();

        let tx = conn.transaction().unwrap();
        store.persist(&ctx, &tx, &certificate("0001")).unwrap();
        assert!(store.exists(&ctx, &tx, "0001").unwrap());
        tx.rollback().unwrap();

        let tx = conn.transaction().unwrap();
        assert!(!store.exists(&ctx, &tx, "0001").unwrap());
    }

    #[test]
    fn test_guard_removed_after_call() {
        let mut conn = LedgerConfig::in_memory().connect().unwrap();
        let store = SqliteCertificateStore::new().cancel_check_ops(1);
        let ctx = Context::background();

        let tx = conn.transaction().unwrap();
        store.persist(&ctx, &tx, &certificate("0001")).unwrap();
        ctx.cancel();

        // A canceled context from an earlier call must not interrupt unrelated statements.
        let count: i64 = tx
            .query_row("SELECT COUNT(*) FROM certificate_ledger", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_store_call_clears_caller_progress_handler() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let mut conn = LedgerConfig::in_memory().connect().unwrap();
        let store = SqliteCertificateStore::new();
        let ctx = Context::background();

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        conn.progress_handler(
            1,
            Some(move || {
                counter.fetch_add(1, Ordering::Relaxed);
                false
            }),
        );

        let tx = conn.transaction().unwrap();
        let sum = "WITH RECURSIVE n(x) AS (SELECT 1 UNION ALL SELECT x + 1 FROM n WHERE x < 1000) \
                   SELECT sum(x) FROM n";
        let _: i64 = tx.query_row(sum, [], |row| row.get(0)).unwrap();
        assert!(calls.load(Ordering::Relaxed) > 0);

        store.count(&ctx, &tx).unwrap();
        let before = calls.load(Ordering::Relaxed);
        let _: i64 = tx.query_row(sum, [], |row| row.get(0)).unwrap();
        assert_eq!(calls.load(Ordering::Relaxed), before);
    }
}
