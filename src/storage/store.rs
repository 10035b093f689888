//! SQLite-backed append-only history store.
//!
//! All statements of a run go through one [`RunTransaction`]. Committing it
//! is the only way a run's rows become durable; dropping it rolls back.

use std::path::Path;

use rusqlite::{Connection, OptionalExtension, Transaction, params};

use crate::error::Result;
use crate::models::{DemandReading, OutageEvent, SummarySnapshot};
use crate::storage::migrations;

/// Row counts and schema version of a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    pub schema_version: i64,
    pub demand_rows: i64,
    pub summary_rows: i64,
    pub event_rows: i64,
}

/// Handle to the history database.
///
/// The connection is closed when the store is dropped.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open (or create) the database at `path` and apply pending migrations.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref())?;
        Self::with_connection(conn)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(mut conn: Connection) -> Result<Self> {
        let version = migrations::migrate(&mut conn)?;
        log::debug!("Store ready at schema version {}", version);
        Ok(Self { conn })
    }

    /// Start the single transaction of a run.
    pub fn begin_run(&mut self) -> Result<RunTransaction<'_>> {
        Ok(RunTransaction {
            tx: self.conn.transaction()?,
        })
    }

    pub fn stats(&self) -> Result<StoreStats> {
        Ok(StoreStats {
            schema_version: migrations::schema_version(&self.conn)?,
            demand_rows: count_rows(&self.conn, "demand")?,
            summary_rows: count_rows(&self.conn, "summary")?,
            event_rows: count_rows(&self.conn, "data")?,
        })
    }
}

fn count_rows(conn: &Connection, table: &str) -> Result<i64> {
    Ok(conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
        row.get(0)
    })?)
}

/// The open transaction of one run.
pub struct RunTransaction<'conn> {
    tx: Transaction<'conn>,
}

impl RunTransaction<'_> {
    /// Insert the run's demand reading.
    ///
    /// A second reading with the same `retrieved_at` violates the unique
    /// constraint and fails the run.
    pub fn insert_demand(&self, reading: &DemandReading) -> Result<()> {
        self.tx.execute(
            "INSERT INTO demand (demand, rating, retrieved_at) VALUES (?1, ?2, ?3)",
            params![reading.demand, reading.rating, reading.retrieved_at],
        )?;
        Ok(())
    }

    /// Insert the run's summary snapshot.
    pub fn insert_summary(&self, snapshot: &SummarySnapshot) -> Result<()> {
        self.tx.execute(
            "INSERT INTO summary (retrieved_at, updated_at, total_cust) VALUES (?1, ?2, ?3)",
            params![
                snapshot.retrieved_at,
                snapshot.updated_at,
                snapshot.total_customers_affected
            ],
        )?;
        Ok(())
    }

    /// Whether an event with the same natural key is already stored,
    /// including rows inserted earlier in this run.
    pub fn exists_event(&self, event: &OutageEvent) -> Result<bool> {
        let key = event.natural_key();
        let mut stmt = self.tx.prepare_cached(
            "SELECT 1 FROM data
             WHERE event_name = ?1 AND council = ?2 AND suburb = ?3 AND cust = ?4
               AND cause = ?5 AND restore_at = ?6 AND streets = ?7
             LIMIT 1",
        )?;
        let found: Option<i64> = stmt
            .query_row(
                params![
                    key.event_name,
                    key.council,
                    key.suburb,
                    key.customers_affected,
                    key.cause,
                    key.restore_at,
                    key.streets
                ],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Insert an event and return its row id.
    ///
    /// Callers check with [`exists_event`](Self::exists_event) first; the
    /// unique index rejects a duplicate that slips through.
    pub fn insert_event(&self, event: &OutageEvent) -> Result<i64> {
        let mut stmt = self.tx.prepare_cached(
            "INSERT INTO data
               (event_name, council, suburb, post_code, cust, cause, restore_at, streets, retrieved_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )?;
        stmt.execute(params![
            event.event_name,
            event.council,
            event.suburb,
            event.post_code,
            event.customers_affected,
            event.cause,
            event.restore_at,
            event.streets,
            event.retrieved_at
        ])?;
        Ok(self.tx.last_insert_rowid())
    }

    /// Make every row of the run durable.
    pub fn commit(self) -> Result<()> {
        self.tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use tempfile::TempDir;

    const T1: &str = "2023-01-05T14:00:00+10:00";
    const T2: &str = "2023-01-05T14:15:00+10:00";

    fn demand(retrieved_at: &str) -> DemandReading {
        DemandReading {
            demand: 2750,
            rating: 7,
            retrieved_at: retrieved_at.to_string(),
        }
    }

    fn summary(retrieved_at: &str) -> SummarySnapshot {
        SummarySnapshot {
            retrieved_at: retrieved_at.to_string(),
            updated_at: "2023-01-05T13:55:00+10:00".to_string(),
            total_customers_affected: 321,
        }
    }

    fn event(name: &str, retrieved_at: &str) -> OutageEvent {
        OutageEvent {
            event_name: name.to_string(),
            council: "Brisbane City".to_string(),
            suburb: "Kangaroo Point".to_string(),
            post_code: "4169".to_string(),
            customers_affected: 12,
            cause: "Fault".to_string(),
            restore_at: "2023-01-05T16:30:00+10:00".to_string(),
            streets: "Main St,Shafston Ave".to_string(),
            retrieved_at: retrieved_at.to_string(),
        }
    }

    #[test]
    fn committed_rows_are_counted() {
        let mut store = Store::open_in_memory().unwrap();
        let run = store.begin_run().unwrap();
        run.insert_demand(&demand(T1)).unwrap();
        run.insert_summary(&summary(T1)).unwrap();
        run.insert_event(&event("incd-1", T1)).unwrap();
        run.insert_event(&event("incd-2", T1)).unwrap();
        run.commit().unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.demand_rows, 1);
        assert_eq!(stats.summary_rows, 1);
        assert_eq!(stats.event_rows, 2);
        assert_eq!(stats.schema_version, migrations::SCHEMA_VERSION);
    }

    #[test]
    fn exists_event_matches_natural_key_across_runs() {
        let mut store = Store::open_in_memory().unwrap();
        let run = store.begin_run().unwrap();
        run.insert_event(&event("incd-1", T1)).unwrap();
        run.commit().unwrap();

        let run = store.begin_run().unwrap();
        assert!(run.exists_event(&event("incd-1", T2)).unwrap());
        assert!(!run.exists_event(&event("incd-9", T2)).unwrap());
    }

    #[test]
    fn exists_event_sees_rows_from_the_open_run() {
        let mut store = Store::open_in_memory().unwrap();
        let run = store.begin_run().unwrap();
        run.insert_event(&event("incd-1", T1)).unwrap();
        assert!(run.exists_event(&event("incd-1", T1)).unwrap());
    }

    #[test]
    fn unique_index_rejects_duplicate_event() {
        let mut store = Store::open_in_memory().unwrap();
        let run = store.begin_run().unwrap();
        run.insert_event(&event("incd-1", T1)).unwrap();

        let err = run.insert_event(&event("incd-1", T2)).unwrap_err();
        assert!(matches!(err, AppError::Store(_)));
    }

    #[test]
    fn duplicate_demand_timestamp_is_rejected() {
        let mut store = Store::open_in_memory().unwrap();
        let run = store.begin_run().unwrap();
        run.insert_demand(&demand(T1)).unwrap();
        assert!(matches!(
            run.insert_demand(&demand(T1)),
            Err(AppError::Store(_))
        ));
    }

    #[test]
    fn dropped_run_is_rolled_back() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("data.sqlite");

        {
            let mut store = Store::open(&path).unwrap();
            let run = store.begin_run().unwrap();
            run.insert_demand(&demand(T1)).unwrap();
            run.insert_event(&event("incd-1", T1)).unwrap();
        }

        let store = Store::open(&path).unwrap();
        let stats = store.stats().unwrap();
        assert_eq!(stats.demand_rows, 0);
        assert_eq!(stats.event_rows, 0);
    }

    #[test]
    fn reopening_keeps_committed_rows() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("data.sqlite");

        {
            let mut store = Store::open(&path).unwrap();
            let run = store.begin_run().unwrap();
            run.insert_summary(&summary(T1)).unwrap();
            run.commit().unwrap();
        }

        let store = Store::open(&path).unwrap();
        assert_eq!(store.stats().unwrap().summary_rows, 1);
    }

    #[test]
    fn open_adopts_scraper_database() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("data.sqlite");
        Connection::open(&path)
            .unwrap()
            .execute_batch(
                "CREATE TABLE data (title TEXT, region TEXT, suburb TEXT, cust TEXT, cause TEXT,
                                    retrieved_at TEXT UNIQUE);
                 CREATE TABLE demand (demand TEXT, rating TEXT, retrieved_at TEXT UNIQUE);
                 CREATE TABLE summary (retrieved_at unique, updated_at TEXT, total_cust TEXT);
                 INSERT INTO data VALUES ('Fault', 'BRISBANE CITY', 'KANGAROO POINT', '12',
                                          'Fault', '2023-01-05T13:00:00+10:00');
                 INSERT INTO demand VALUES ('1200', '3', '2023-01-05T13:00:00+10:00');",
            )
            .unwrap();

        let mut store = Store::open(&path).unwrap();
        let run = store.begin_run().unwrap();
        run.insert_demand(&demand(T1)).unwrap();
        run.insert_summary(&summary(T1)).unwrap();
        assert!(!run.exists_event(&event("incd-1", T1)).unwrap());
        run.insert_event(&event("incd-1", T1)).unwrap();
        run.commit().unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.demand_rows, 2);
        assert_eq!(stats.event_rows, 1);
        assert_eq!(count_rows(&store.conn, "data_legacy").unwrap(), 1);
    }
}
