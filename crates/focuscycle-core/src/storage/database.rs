//! SQLite-backed counters.
//!
//! Provides persistent storage for:
//! - Per-day focus statistics (one row per local calendar day)
//! - Key-value store for the all-time total and the in-flight interval

use std::path::Path;

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::DatabaseError;
use crate::stats::DailyStats;

pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the database file at `path`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), DatabaseError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS daily_stats (
                day           TEXT PRIMARY KEY,
                sessions      INTEGER NOT NULL DEFAULT 0,
                focus_seconds INTEGER NOT NULL DEFAULT 0
            );",
        )?;
        Ok(())
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn kv_delete(&self, key: &str) -> Result<(), DatabaseError> {
        self.conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }

    pub fn upsert_daily(&self, stats: &DailyStats) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT INTO daily_stats (day, sessions, focus_seconds) VALUES (?1, ?2, ?3)
             ON CONFLICT(day) DO UPDATE SET
                sessions = excluded.sessions,
                focus_seconds = excluded.focus_seconds",
            params![
                stats.day_key.format("%Y-%m-%d").to_string(),
                stats.sessions_completed_today,
                stats.focus_seconds_today,
            ],
        )?;
        Ok(())
    }

    pub fn daily(&self, day: NaiveDate) -> Result<Option<DailyStats>, DatabaseError> {
        let row = self
            .conn
            .query_row(
                "SELECT sessions, focus_seconds FROM daily_stats WHERE day = ?1",
                params![day.format("%Y-%m-%d").to_string()],
                |row| Ok((row.get::<_, u32>(0)?, row.get::<_, u32>(1)?)),
            )
            .optional()?;
        Ok(row.map(|(sessions, focus_seconds)| DailyStats {
            day_key: day,
            sessions_completed_today: sessions,
            focus_seconds_today: focus_seconds,
        }))
    }

    /// Most recent `limit` days with recorded stats, newest first.
    pub fn history(&self, limit: u32) -> Result<Vec<DailyStats>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT day, sessions, focus_seconds FROM daily_stats
             ORDER BY day DESC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, u32>(1)?,
                row.get::<_, u32>(2)?,
            ))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (day, sessions, focus_seconds) = row?;
            match NaiveDate::parse_from_str(&day, "%Y-%m-%d") {
                Ok(day_key) => out.push(DailyStats {
                    day_key,
                    sessions_completed_today: sessions,
                    focus_seconds_today: focus_seconds,
                }),
                Err(e) => tracing::warn!(%day, error = %e, "skipping malformed daily_stats row"),
            }
        }
        Ok(out)
    }
}
