//! Storage trait definitions

use crate::context::Context;
use crate::record::CertificateRecord;
use crate::storage::error::StoreResult;

/// Number of certificates returned by [`CertificateStore::list_recent`].
pub const RECENT_WINDOW: usize = 20;

/// Transactional certificate persistence.
///
/// Every operation runs inside a unit of work owned by the caller (`Tx`).
/// Implementations issue statements against it but never begin, commit or
/// roll it back, and hold no database handle of their own.
pub trait CertificateStore {
    /// The caller-owned unit of work operations run in.
    type Tx<'conn>;

    /// Insert a certificate.
    ///
    /// Exactly one atomic insert of all seven fields. Returns
    /// `StoreError::ConstraintViolation` if the id is already present, in
    /// which case nothing is written.
    fn persist(
        &self,
        ctx: &Context,
        tx: &Self::Tx<'_>,
        record: &CertificateRecord,
    ) -> StoreResult<()>;

    /// Most recent certificates, newest first, at most `limit` of them.
    ///
    /// "Most recent" means largest id; see [`CertificateRecord::id`].
    fn list_latest(
        &self,
        ctx: &Context,
        tx: &Self::Tx<'_>,
        limit: usize,
    ) -> StoreResult<Vec<CertificateRecord>>;

    /// The [`RECENT_WINDOW`] certificates with the largest ids, ordered by
    /// id descending. Empty when nothing has been persisted.
    ///
    /// The read is all-or-nothing: if any row fails to decode, no records
    /// are returned.
    fn list_recent(
        &self,
        ctx: &Context,
        tx: &Self::Tx<'_>,
    ) -> StoreResult<Vec<CertificateRecord>> {
        self.list_latest(ctx, tx, RECENT_WINDOW)
    }

    /// Retrieve a certificate by id.
    ///
    /// Returns `None` if not found.
    fn get(
        &self,
        ctx: &Context,
        tx: &Self::Tx<'_>,
        id: &str,
    ) -> StoreResult<Option<CertificateRecord>>;

    /// Check if a certificate exists.
    fn exists(&self, ctx: &Context, tx: &Self::Tx<'_>, id: &str) -> StoreResult<bool> {
        Ok(self.get(ctx, tx, id)?.is_some())
    }

    /// Total number of persisted certificates.
    fn count(&self, ctx: &Context, tx: &Self::Tx<'_>) -> StoreResult<usize>;
}
