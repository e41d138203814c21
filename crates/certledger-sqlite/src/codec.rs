//! Column encoding for the certificate ledger
//!
//! Both directions work on the same fixed column order:
//! `id, block_number, block_hash, merkle_root, multi_sig, sig_started_at, sig_finished_at`.
//! A schema change has to update [`COLUMNS`], the insert parameters in
//! `store.rs` and [`decode_row`] together.

use certledger_core::{CertificateRecord, StoreError, StoreResult};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::Row;

/// Ledger columns in their fixed order
pub const COLUMNS: &str =
    "id, block_number, block_hash, merkle_root, multi_sig, sig_started_at, sig_finished_at";

/// Convert a timestamp to its stored form (RFC 3339, UTC, nanosecond precision).
///
/// The fixed width keeps stored values lexically ordered by time.
pub fn timestamp_to_sql(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Parse a stored RFC 3339 timestamp.
pub fn sql_to_timestamp(datetime_str: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    Ok(DateTime::parse_from_rfc3339(datetime_str)?.with_timezone(&Utc))
}

/// Convert a block number to SQLite's signed INTEGER.
pub fn block_number_to_sql(block_number: u64) -> Option<i64> {
    i64::try_from(block_number).ok()
}

/// Decode one ledger row into a certificate.
///
/// Positional and fixed-arity; any column that does not match its expected
/// type fails the whole row with `StoreError::Decode`.
pub fn decode_row(row: &Row<'_>) -> StoreResult<CertificateRecord> {
    let id: String = column(row, 0, "id")?;

    let raw_block_number: i64 = column(row, 1, "block_number")?;
    let block_number = u64::try_from(raw_block_number).map_err(|_| {
        StoreError::Decode(format!(
            "certificate {}: negative block_number {}",
            id, raw_block_number
        ))
    })?;

    let block_hash: String = column(row, 2, "block_hash")?;
    let merkle_root: String = column(row, 3, "merkle_root")?;
    let multi_sig: Vec<u8> = column(row, 4, "multi_sig")?;

    let sig_started_at = timestamp_column(row, 5, "sig_started_at", &id)?;
    let sig_finished_at = timestamp_column(row, 6, "sig_finished_at", &id)?;

    Ok(CertificateRecord {
        id,
        block_number,
        block_hash,
        merkle_root,
        multi_sig,
        sig_started_at,
        sig_finished_at,
    })
}

fn column<T: rusqlite::types::FromSql>(
    row: &Row<'_>,
    index: usize,
    name: &str,
) -> StoreResult<T> {
    row.get(index)
        .map_err(|e| StoreError::Decode(format!("column {}: {}", name, e)))
}

fn timestamp_column(
    row: &Row<'_>,
    index: usize,
    name: &str,
    id: &str,
) -> StoreResult<DateTime<Utc>> {
    let raw: String = column(row, index, name)?;
    sql_to_timestamp(&raw).map_err(|e| {
        StoreError::Decode(format!(
            "certificate {}: invalid {} {:?}: {}",
            id, name, raw, e
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamp_roundtrip_keeps_nanoseconds() {
        let original = Utc
            .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
            .unwrap()
            .checked_add_signed(chrono::Duration::nanoseconds(123_456_789))
            .unwrap();
        let sql_str = timestamp_to_sql(&original);
        assert_eq!(sql_str, "2024-01-01T00:00:00.123456789Z");
        assert_eq!(sql_to_timestamp(&sql_str).unwrap(), original);
    }

    #[test]
    fn test_offset_timestamps_normalize_to_utc() {
        let parsed = sql_to_timestamp("2024-01-01T02:00:00+02:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_invalid_timestamp() {
        assert!(sql_to_timestamp("yesterday").is_err());
    }

    #[test]
    fn test_block_number_range() {
        assert_eq!(block_number_to_sql(42), Some(42));
        assert_eq!(block_number_to_sql(i64::MAX as u64), Some(i64::MAX));
        assert_eq!(block_number_to_sql(u64::MAX), None);
    }

    #[test]
    fn test_decode_row() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        let record = conn
            .query_row(
                "SELECT 'c1', 7, 'bh', 'mr', x'0102', \
                 '2024-01-01T00:00:00.000000000Z', '2024-01-01T00:00:01.000000000Z'",
                [],
                |row| Ok(decode_row(row)),
            )
            .unwrap()
            .unwrap();

        assert_eq!(record.id, "c1");
        assert_eq!(record.block_number, 7);
        assert_eq!(record.multi_sig, vec![1, 2]);
        assert_eq!(record.signing_duration(), chrono::Duration::seconds(1));
    }

    #[test]
    fn test_decode_row_rejects_text_signature() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        let result = conn
            .query_row(
                "SELECT 'c1', 7, 'bh', 'mr', 'not-a-blob', \
                 '2024-01-01T00:00:00Z', '2024-01-01T00:00:01Z'",
                [],
                |row| Ok(decode_row(row)),
            )
            .unwrap();

        assert!(matches!(result, Err(StoreError::Decode(_))));
    }
}
