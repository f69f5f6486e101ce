use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// Bookkeeping row for one import run.
#[derive(Debug, Clone, Serialize)]
pub struct ImportRun {
    pub id: i64,
    pub started_at: DateTime<Utc>,
    pub window_start: NaiveDate,
    /// Rows parsed from the import before the recency filter.
    pub rows_loaded: u32,
    pub rows_in_window: u32,
    pub movies: u32,
    pub shows: u32,
}
