//! Database migration runner
//!
//! Embeds the ledger schema and applies it to SQLite databases. Each
//! migration runs in its own transaction and is recorded in
//! `schema_migrations`, so opening an existing ledger is a no-op.

use rusqlite::Connection;
use tracing::debug;

use crate::error::{Result, SqliteError};

/// Migration files embedded from `migrations/`
const MIGRATIONS: &[(&str, &str)] = &[
    (
        "000",
        include_str!("../migrations/000_create_schema_migrations.sql"),
    ),
    (
        "001",
        include_str!("../migrations/001_create_certificate_ledger.sql"),
    ),
];

/// Apply all pending migrations to the database
///
/// # Errors
///
/// Returns an error if any migration fails to apply.
pub fn migrate(conn: &Connection) -> Result<()> {
    for (version, sql) in MIGRATIONS {
        apply_migration(conn, version, sql)?;
    }

    Ok(())
}

/// Apply a single migration if it hasn't been applied yet
fn apply_migration(conn: &Connection, version: &str, sql: &str) -> Result<()> {
    if is_migration_applied(conn, version)? {
        return Ok(());
    }

    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(sql)
        .map_err(|e| SqliteError::Migration(format!("{}: {}", version, e)))?;
    record_migration(&tx, version)?;
    tx.commit()?;

    debug!(version, "applied ledger migration");
    Ok(())
}

/// Check if a migration has already been applied
fn is_migration_applied(conn: &Connection, version: &str) -> Result<bool> {
    let table_exists = conn
        .prepare("SELECT name FROM sqlite_master WHERE type='table' AND name='schema_migrations'")?
        .exists([])?;

    if !table_exists {
        return Ok(false);
    }

    let exists = conn
        .prepare("SELECT 1 FROM schema_migrations WHERE version = ?")?
        .exists([version])?;

    Ok(exists)
}

/// Record that a migration has been applied
fn record_migration(conn: &Connection, version: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO schema_migrations (version, applied_at) VALUES (?, CURRENT_TIMESTAMP)",
        [version],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_exists(conn: &Connection, name: &str) -> bool {
        conn.prepare("SELECT name FROM sqlite_master WHERE type='table' AND name=?")
            .unwrap()
            .exists([name])
            .unwrap()
    }

    #[test]
    fn test_migrate_creates_tables() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();

        assert!(table_exists(&conn, "schema_migrations"));
        assert!(table_exists(&conn, "certificate_ledger"));
    }

    #[test]
    fn test_migrate_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();

        migrate(&conn).unwrap();
        migrate(&conn).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_migrations", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 2); // 000 and 001
    }

    #[test]
    fn test_ledger_columns_in_order() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();

        let columns: Vec<String> = conn
            .prepare("SELECT name FROM pragma_table_info('certificate_ledger') ORDER BY cid")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<_, _>>()
            .unwrap();

        assert_eq!(columns.join(", "), crate::codec::COLUMNS);
    }
}
