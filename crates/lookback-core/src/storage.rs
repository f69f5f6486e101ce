use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::LookbackError;
use crate::models::ImportRun;

const SCHEMA_V1: &str = include_str!("../../../migrations/001_initial.sql");
const SCHEMA_V2: &str = include_str!("../../../migrations/002_import_runs.sql");

/// Key the viewing-history CSV is stored under.
pub const VIEWING_HISTORY_KEY: &str = "viewing_history";

/// SQLite-backed storage: the raw import blob plus a log of import runs.
pub struct Storage {
    conn: Connection,
}

impl Storage {
    /// Open (or create) the database at the given path and run migrations.
    pub fn open(path: &Path) -> Result<Self, LookbackError> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        run_migrations(&conn)?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, LookbackError> {
        let conn = Connection::open_in_memory()?;
        run_migrations(&conn)?;
        Ok(Self { conn })
    }

    // ── Key-value import store ──────────────────────────────────

    /// Insert or replace the value under `key`.
    pub fn put_value(&self, key: &str, value: &str) -> Result<(), LookbackError> {
        self.conn.execute(
            "INSERT INTO import_store (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value,
                                            updated_at = excluded.updated_at",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn get_value(&self, key: &str) -> Result<Option<String>, LookbackError> {
        self.conn
            .query_row(
                "SELECT value FROM import_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(Into::into)
    }

    /// Remove `key`. Returns whether a value was present.
    pub fn delete_value(&self, key: &str) -> Result<bool, LookbackError> {
        let n = self
            .conn
            .execute("DELETE FROM import_store WHERE key = ?1", params![key])?;
        Ok(n > 0)
    }

    /// Store the viewing-history CSV under [`VIEWING_HISTORY_KEY`].
    pub fn save_viewing_history(&self, csv: &str) -> Result<(), LookbackError> {
        self.put_value(VIEWING_HISTORY_KEY, csv)
    }

    pub fn viewing_history(&self) -> Result<Option<String>, LookbackError> {
        self.get_value(VIEWING_HISTORY_KEY)
    }

    // ── Import run log ──────────────────────────────────────────

    /// Record a started run. Returns the new row id.
    pub fn record_run(&self, run: &ImportRun) -> Result<i64, LookbackError> {
        self.conn.execute(
            "INSERT INTO import_runs (started_at, window_start, rows_loaded,
             rows_in_window, movies, shows)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                run.started_at.to_rfc3339(),
                run.window_start.to_string(),
                run.rows_loaded,
                run.rows_in_window,
                run.movies,
                run.shows,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Most recent runs first.
    pub fn recent_runs(&self, limit: usize) -> Result<Vec<ImportRun>, LookbackError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, started_at, window_start, rows_loaded, rows_in_window, movies, shows
             FROM import_runs ORDER BY id DESC LIMIT ?1",
        )?;
        let rows = stmt
            .query_map(params![limit as i64], |row| Ok(row_to_run(row)))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(rows)
    }
}

fn run_migrations(conn: &Connection) -> Result<(), LookbackError> {
    let version: i32 = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .unwrap_or(0);

    if version < 1 {
        conn.execute_batch(SCHEMA_V1)?;
        conn.pragma_update(None, "user_version", 1)?;
    }
    if version < 2 {
        conn.execute_batch(SCHEMA_V2)?;
        conn.pragma_update(None, "user_version", 2)?;
    }
    Ok(())
}

// ── Helpers ─────────────────────────────────────────────────────

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_default()
}

fn row_to_run(row: &rusqlite::Row<'_>) -> ImportRun {
    let started: String = row.get(1).unwrap_or_default();
    let window: String = row.get(2).unwrap_or_default();

    ImportRun {
        id: row.get(0).unwrap_or(0),
        started_at: parse_datetime(&started),
        window_start: window.parse::<NaiveDate>().unwrap_or_default(),
        rows_loaded: row.get(3).unwrap_or(0),
        rows_in_window: row.get(4).unwrap_or(0),
        movies: row.get(5).unwrap_or(0),
        shows: row.get(6).unwrap_or(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(movies: u32, shows: u32) -> ImportRun {
        ImportRun {
            id: 0,
            started_at: Utc::now(),
            window_start: NaiveDate::from_ymd_opt(2023, 3, 15).unwrap(),
            rows_loaded: movies + shows + 2,
            rows_in_window: movies + shows,
            movies,
            shows,
        }
    }

    #[test]
    fn test_put_and_get_value() {
        let db = Storage::open_memory().unwrap();
        assert!(db.get_value("missing").unwrap().is_none());

        db.put_value("k", "first").unwrap();
        db.put_value("k", "second").unwrap();
        assert_eq!(db.get_value("k").unwrap().as_deref(), Some("second"));
    }

    #[test]
    fn test_delete_value() {
        let db = Storage::open_memory().unwrap();
        db.put_value("k", "v").unwrap();
        assert!(db.delete_value("k").unwrap());
        assert!(!db.delete_value("k").unwrap());
        assert!(db.get_value("k").unwrap().is_none());
    }

    #[test]
    fn test_viewing_history_uses_fixed_key() {
        let db = Storage::open_memory().unwrap();
        db.save_viewing_history("Title,Date\n").unwrap();
        assert_eq!(
            db.get_value(VIEWING_HISTORY_KEY).unwrap().as_deref(),
            Some("Title,Date\n")
        );
        assert_eq!(db.viewing_history().unwrap().as_deref(), Some("Title,Date\n"));
    }

    #[test]
    fn test_run_log_newest_first() {
        let db = Storage::open_memory().unwrap();
        let first = db.record_run(&run(1, 2)).unwrap();
        let second = db.record_run(&run(3, 4)).unwrap();
        assert!(second > first);

        let runs = db.recent_runs(10).unwrap();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].id, second);
        assert_eq!(runs[0].movies, 3);
        assert_eq!(runs[1].shows, 2);
        assert_eq!(runs[1].window_start.to_string(), "2023-03-15");

        assert_eq!(db.recent_runs(1).unwrap().len(), 1);
    }

    #[test]
    fn test_reopen_keeps_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lookback.db");
        {
            let db = Storage::open(&path).unwrap();
            db.save_viewing_history("Title,Date\nHeat,2024-01-01").unwrap();
        }
        let db = Storage::open(&path).unwrap();
        assert!(db.viewing_history().unwrap().is_some());
    }
}
