//! Storage layer for the shift tracker.
//!
//! Persists the activity ledger and the extended-driving days using `rusqlite`.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! A `Database` instance can be moved between threads but cannot be shared
//! across threads without external synchronization.
//!
//! # Schema
//!
//! ## Timestamp Format
//!
//! Interval bounds are stored as INTEGER epoch milliseconds, the same unit the
//! serialized ledger uses. Extension days are stored as TEXT `YYYY-MM-DD`.
//!
//! ## Corrupt Rows
//!
//! Activity types are stored as TEXT, so a row can hold a type this build
//! does not know. Such rows are skipped on load with a warning, and the next
//! save rewrites the tables from the valid ledger, dropping them. Extension
//! days that do not parse are skipped the same way.

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use thiserror::Error;
use trike_core::{Ledger, LedgerStore, StoredCurrent, StoredEvent, StoredLedger};

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            -- Closed intervals, in append order.
            -- start_ms/end_ms: epoch milliseconds
            -- type: activity type (e.g., 'DRIVE', 'REST_DAILY')
            CREATE TABLE IF NOT EXISTS activity_events (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                type TEXT NOT NULL,
                start_ms INTEGER NOT NULL,
                end_ms INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_activity_events_start ON activity_events(start_ms);

            -- At most one open interval.
            CREATE TABLE IF NOT EXISTS current_activity (
                slot INTEGER PRIMARY KEY CHECK (slot = 0),
                type TEXT NOT NULL,
                started_at_ms INTEGER NOT NULL
            );

            -- Local calendar days on which extended driving was used.
            CREATE TABLE IF NOT EXISTS extension_days (
                day TEXT PRIMARY KEY,
                used_at_ms INTEGER NOT NULL
            );
            ",
        )?;
        Ok(())
    }

    /// Reads the raw serialized ledger without validating records.
    pub fn load_stored(&self) -> Result<StoredLedger, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT type, start_ms, end_ms
            FROM activity_events
            ORDER BY id ASC
            ",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(StoredEvent {
                kind: row.get(0)?,
                start: row.get(1)?,
                end: row.get(2)?,
            })
        })?;
        let mut events = Vec::new();
        for row in rows {
            events.push(row?);
        }

        let current = self
            .conn
            .query_row(
                "SELECT type, started_at_ms FROM current_activity WHERE slot = 0",
                [],
                |row| {
                    Ok(StoredCurrent {
                        kind: row.get(0)?,
                        started_at: row.get(1)?,
                    })
                },
            )
            .optional()?;

        Ok(StoredLedger { events, current })
    }

    /// Replaces the stored ledger with `stored` in one transaction.
    pub fn save_stored(&mut self, stored: &StoredLedger) -> Result<(), DbError> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM activity_events", [])?;
        tx.execute("DELETE FROM current_activity", [])?;
        {
            let mut stmt = tx.prepare(
                "
                INSERT INTO activity_events (type, start_ms, end_ms)
                VALUES (?, ?, ?)
                ",
            )?;
            for event in &stored.events {
                stmt.execute(params![event.kind, event.start, event.end])?;
            }
        }
        if let Some(current) = &stored.current {
            tx.execute(
                "INSERT INTO current_activity (slot, type, started_at_ms) VALUES (0, ?, ?)",
                params![current.kind, current.started_at],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Lists the days on which extended driving was used, oldest first.
    ///
    /// Rows whose day does not parse are skipped with a warning.
    pub fn list_extension_days(&self) -> Result<Vec<NaiveDate>, DbError> {
        let mut stmt = self
            .conn
            .prepare("SELECT day FROM extension_days ORDER BY day ASC")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut days = Vec::new();
        for row in rows {
            let day = row?;
            match NaiveDate::parse_from_str(&day, "%Y-%m-%d") {
                Ok(parsed) => days.push(parsed),
                Err(err) => {
                    tracing::warn!(%day, error = %err, "skipping invalid extension day");
                }
            }
        }
        Ok(days)
    }

    /// Records an extended driving day, ignoring duplicates.
    ///
    /// Returns `true` if the day was newly recorded.
    pub fn record_extension_day(
        &mut self,
        day: NaiveDate,
        used_at: DateTime<Utc>,
    ) -> Result<bool, DbError> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO extension_days (day, used_at_ms) VALUES (?, ?)",
            params![day.format("%Y-%m-%d").to_string(), used_at.timestamp_millis()],
        )?;
        Ok(inserted > 0)
    }
}

impl LedgerStore for Database {
    type Error = DbError;

    fn load(&self) -> Result<Ledger, DbError> {
        let (ledger, discarded) = Ledger::rehydrate(self.load_stored()?);
        if discarded > 0 {
            tracing::warn!(discarded, "skipped corrupt ledger rows");
        }
        Ok(ledger)
    }

    fn save(&mut self, ledger: &Ledger) -> Result<(), DbError> {
        self.save_stored(&ledger.to_stored())?;
        tracing::debug!(events = ledger.events().len(), "ledger saved");
        Ok(())
    }

    fn load_extension_days(&self) -> Result<Option<Vec<NaiveDate>>, DbError> {
        self.list_extension_days().map(Some)
    }
}
