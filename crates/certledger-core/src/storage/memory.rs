//! In-memory storage backend
//!
//! `MemoryLedger` plays the role of the database: it owns the committed
//! certificates and hands out transactions. `MemoryStore` is the stateless
//! store that runs operations inside a caller's `MemoryTx`, mirroring how the
//! SQLite backend works against a caller's `rusqlite::Transaction`.
//!
//! Not suitable for production use due to lack of persistence.

use std::collections::{BTreeMap, BTreeSet};

use parking_lot::Mutex;

use crate::context::Context;
use crate::record::CertificateRecord;
use crate::storage::error::{StoreError, StoreResult};
use crate::storage::traits::CertificateStore;

/// Committed certificates, keyed and ordered by id.
///
/// Ids staged by an open transaction are reserved until it commits or is
/// dropped, so a second transaction persisting the same id fails at
/// `persist` just as it would against a primary key.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    // Lock order: reserved, then committed.
    reserved: Mutex<BTreeSet<String>>,
    committed: Mutex<BTreeMap<String, CertificateRecord>>,
}

impl MemoryLedger {
    /// Create a new empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a unit of work. Dropping it without [`MemoryTx::commit`] discards
    /// its writes.
    pub fn begin(&self) -> MemoryTx<'_> {
        MemoryTx {
            ledger: self,
            pending: Mutex::new(BTreeMap::new()),
        }
    }

    /// Number of committed certificates.
    pub fn len(&self) -> usize {
        self.committed.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.committed.lock().is_empty()
    }

    fn reserve(&self, id: &str) -> StoreResult<()> {
        let mut reserved = self.reserved.lock();
        if reserved.contains(id) || self.committed.lock().contains_key(id) {
            return Err(StoreError::ConstraintViolation(id.to_string()));
        }
        reserved.insert(id.to_string());
        Ok(())
    }

    fn release<'a>(&self, ids: impl Iterator<Item = &'a String>) {
        let mut reserved = self.reserved.lock();
        for id in ids {
            reserved.remove(id);
        }
    }
}

/// A unit of work against a [`MemoryLedger`].
///
/// Writes are staged until commit and visible to reads through the same
/// transaction.
#[derive(Debug)]
pub struct MemoryTx<'a> {
    ledger: &'a MemoryLedger,
    pending: Mutex<BTreeMap<String, CertificateRecord>>,
}

impl MemoryTx<'_> {
    /// Apply staged writes.
    pub fn commit(mut self) {
        let pending = std::mem::take(self.pending.get_mut());
        let mut reserved = self.ledger.reserved.lock();
        let mut committed = self.ledger.committed.lock();
        for (id, record) in pending {
            reserved.remove(&id);
            committed.insert(id, record);
        }
    }

    /// Discard staged writes.
    pub fn rollback(self) {}

    /// Committed state overlaid with this transaction's staged writes,
    /// limited to the `limit` largest ids.
    fn latest(&self, limit: usize) -> Vec<CertificateRecord> {
        let mut view: BTreeMap<String, CertificateRecord> = BTreeMap::new();
        {
            let pending = self.pending.lock();
            view.extend(
                pending
                    .iter()
                    .rev()
                    .take(limit)
                    .map(|(id, record)| (id.clone(), record.clone())),
            );
        }
        {
            let committed = self.ledger.committed.lock();
            view.extend(
                committed
                    .iter()
                    .rev()
                    .take(limit)
                    .map(|(id, record)| (id.clone(), record.clone())),
            );
        }
        view.into_values().rev().take(limit).collect()
    }

    fn lookup(&self, id: &str) -> Option<CertificateRecord> {
        if let Some(record) = self.ledger.committed.lock().get(id) {
            return Some(record.clone());
        }
        self.pending.lock().get(id).cloned()
    }
}

impl Drop for MemoryTx<'_> {
    fn drop(&mut self) {
        let pending = self.pending.get_mut();
        if !pending.is_empty() {
            self.ledger.release(pending.keys());
        }
    }
}

/// Stateless store operating on a caller's [`MemoryTx`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryStore;

impl MemoryStore {
    pub fn new() -> Self {
        Self
    }
}

impl CertificateStore for MemoryStore {
    type Tx<'conn> = MemoryTx<'conn>;

    fn persist(
        &self,
        ctx: &Context,
        tx: &MemoryTx<'_>,
        record: &CertificateRecord,
    ) -> StoreResult<()> {
        ctx.check()?;

        let mut pending = tx.pending.lock();
        if pending.contains_key(&record.id) {
            return Err(StoreError::ConstraintViolation(record.id.clone()));
        }
        tx.ledger.reserve(&record.id)?;
        pending.insert(record.id.clone(), record.clone());
        Ok(())
    }

    fn list_latest(
        &self,
        ctx: &Context,
        tx: &MemoryTx<'_>,
        limit: usize,
    ) -> StoreResult<Vec<CertificateRecord>> {
        ctx.check()?;
        Ok(tx.latest(limit))
    }

    fn get(
        &self,
        ctx: &Context,
        tx: &MemoryTx<'_>,
        id: &str,
    ) -> StoreResult<Option<CertificateRecord>> {
        ctx.check()?;
        Ok(tx.lookup(id))
    }

    fn count(&self, ctx: &Context, tx: &MemoryTx<'_>) -> StoreResult<usize> {
        ctx.check()?;
        let pending = tx.pending.lock().len();
        Ok(tx.ledger.len() + pending)
    }
}
