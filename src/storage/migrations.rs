//! Versioned schema migrations.
//!
//! The applied version lives in SQLite's `PRAGMA user_version`. Each pending
//! migration runs in its own transaction together with the version bump.
//!
//! Databases written by the earlier scraper carry `demand` and `summary`
//! tables with matching columns, which are adopted in place, and a `data`
//! table with a different layout, which is kept as `data_legacy`.

use rusqlite::Connection;

use crate::error::{AppError, Result};

/// Schema version this build writes.
pub const SCHEMA_VERSION: i64 = 1;

struct Migration {
    version: i64,
    name: &'static str,
    /// Runs inside the migration's transaction before `sql`.
    prepare: fn(&Connection) -> Result<()>,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "create_history_tables",
    prepare: set_aside_legacy_events,
    sql: "
        CREATE TABLE IF NOT EXISTS demand (
          demand INTEGER NOT NULL,
          rating INTEGER NOT NULL,
          retrieved_at TEXT NOT NULL UNIQUE
        );
        CREATE TABLE IF NOT EXISTS summary (
          retrieved_at TEXT NOT NULL UNIQUE,
          updated_at TEXT NOT NULL,
          total_cust INTEGER NOT NULL
        );
        CREATE TABLE IF NOT EXISTS data (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          event_name TEXT NOT NULL,
          council TEXT NOT NULL,
          suburb TEXT NOT NULL,
          post_code TEXT NOT NULL,
          cust INTEGER NOT NULL,
          cause TEXT NOT NULL,
          restore_at TEXT NOT NULL,
          streets TEXT NOT NULL,
          retrieved_at TEXT NOT NULL
        );
        CREATE UNIQUE INDEX IF NOT EXISTS data_natural_key
          ON data (event_name, council, suburb, cust, cause, restore_at, streets);
        ",
}];

fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    Ok(conn.query_row(
        "SELECT EXISTS (SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)",
        [table],
        |row| row.get(0),
    )?)
}

fn has_column(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    Ok(conn.query_row(
        "SELECT EXISTS (SELECT 1 FROM pragma_table_info(?1) WHERE name = ?2)",
        [table, column],
        |row| row.get(0),
    )?)
}

/// Rename a `data` table without `event_name` to `data_legacy`.
fn set_aside_legacy_events(conn: &Connection) -> Result<()> {
    if !table_exists(conn, "data")? || has_column(conn, "data", "event_name")? {
        return Ok(());
    }
    if table_exists(conn, "data_legacy")? {
        return Err(AppError::validation(
            "database has both an old-layout data table and data_legacy",
        ));
    }

    conn.execute_batch("ALTER TABLE data RENAME TO data_legacy;")?;
    log::warn!("Kept old-layout data table as data_legacy");
    Ok(())
}

/// Read the applied schema version.
pub fn schema_version(conn: &Connection) -> Result<i64> {
    Ok(conn.query_row("PRAGMA user_version", [], |row| row.get(0))?)
}

/// Apply every migration newer than the database's version.
///
/// Returns the resulting schema version.
pub fn migrate(conn: &mut Connection) -> Result<i64> {
    let current = schema_version(conn)?;
    if current > SCHEMA_VERSION {
        return Err(AppError::validation(format!(
            "database schema version {current} is newer than supported version {SCHEMA_VERSION}"
        )));
    }

    for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
        let tx = conn.transaction()?;
        (migration.prepare)(&tx)?;
        tx.execute_batch(migration.sql)?;
        tx.execute_batch(&format!("PRAGMA user_version = {};", migration.version))?;
        tx.commit()?;
        log::info!(
            "Applied schema migration {} ({})",
            migration.version,
            migration.name
        );
    }

    schema_version(conn)
}
