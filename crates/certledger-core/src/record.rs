//! Certificate record definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A finalized certificate: the fact that a quorum of stake-weighted signers
/// endorsed a block (height + hash) together with a Merkle-summarized state.
///
/// Records are assembled by the aggregator after a signing round and are
/// never updated once persisted. The store treats `merkle_root` and
/// `multi_sig` as opaque values and returns them verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateRecord {
    /// Primary key. Recency queries order by this id (byte-wise), so the
    /// aggregator's id generator must be monotonic with creation order,
    /// e.g. a zero-padded counter or a time-sortable identifier.
    pub id: String,

    /// Blockchain height attested
    pub block_number: u64,

    /// Hash of the block at `block_number`
    pub block_hash: String,

    /// Root of the state summary that was signed
    pub merkle_root: String,

    /// Combined threshold signature over `merkle_root`
    #[serde(with = "hex_bytes")]
    pub multi_sig: Vec<u8>,

    /// Start of the signing round
    pub sig_started_at: DateTime<Utc>,

    /// End of the signing round
    pub sig_finished_at: DateTime<Utc>,
}

impl CertificateRecord {
    /// Duration of the signing round that produced this certificate.
    pub fn signing_duration(&self) -> chrono::Duration {
        self.sig_finished_at - self.sig_started_at
    }

    /// Check the invariants a record must hold before it is handed to a store.
    pub fn validate(&self) -> Result<(), RecordError> {
        if self.id.is_empty() {
            return Err(RecordError::EmptyId);
        }
        if self.sig_started_at > self.sig_finished_at {
            return Err(RecordError::SigningWindow {
                started_at: self.sig_started_at,
                finished_at: self.sig_finished_at,
            });
        }
        Ok(())
    }
}

/// Errors raised while assembling a certificate record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("certificate id must not be empty")]
    EmptyId,

    #[error("signing round finished at {finished_at} before it started at {started_at}")]
    SigningWindow {
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    },
}

/// Builder for creating certificate records
#[derive(Debug, Clone, Default)]
pub struct CertificateBuilder {
    id: String,
    block_number: u64,
    block_hash: String,
    merkle_root: String,
    multi_sig: Vec<u8>,
    sig_started_at: Option<DateTime<Utc>>,
    sig_finished_at: Option<DateTime<Utc>>,
}

impl CertificateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn block_number(mut self, block_number: u64) -> Self {
        self.block_number = block_number;
        self
    }

    pub fn block_hash(mut self, block_hash: impl Into<String>) -> Self {
        self.block_hash = block_hash.into();
        self
    }

    pub fn merkle_root(mut self, merkle_root: impl Into<String>) -> Self {
        self.merkle_root = merkle_root.into();
        self
    }

    pub fn multi_sig(mut self, multi_sig: impl Into<Vec<u8>>) -> Self {
        self.multi_sig = multi_sig.into();
        self
    }

    pub fn sig_started_at(mut self, started_at: DateTime<Utc>) -> Self {
        self.sig_started_at = Some(started_at);
        self
    }

    pub fn sig_finished_at(mut self, finished_at: DateTime<Utc>) -> Self {
        self.sig_finished_at = Some(finished_at);
        self
    }

    /// Set both ends of the signing round at once.
    pub fn signed_between(self, started_at: DateTime<Utc>, finished_at: DateTime<Utc>) -> Self {
        self.sig_started_at(started_at).sig_finished_at(finished_at)
    }

    /// Build the record.
    ///
    /// A missing start defaults to the finish time (and vice versa); when both
    /// are missing the round is stamped with the current time.
    pub fn build(self) -> Result<CertificateRecord, RecordError> {
        let (sig_started_at, sig_finished_at) = match (self.sig_started_at, self.sig_finished_at) {
            (Some(start), Some(finish)) => (start, finish),
            (Some(start), None) => (start, start),
            (None, Some(finish)) => (finish, finish),
            (None, None) => {
                let now = Utc::now();
                (now, now)
            }
        };

        let record = CertificateRecord {
            id: self.id,
            block_number: self.block_number,
            block_hash: self.block_hash,
            merkle_root: self.merkle_root,
            multi_sig: self.multi_sig,
            sig_started_at,
            sig_finished_at,
        };
        record.validate()?;
        Ok(record)
    }
}

/// Hex encoding for binary fields in JSON output
mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        hex::decode(encoded).map_err(serde::de::Error::custom)
    }
}
