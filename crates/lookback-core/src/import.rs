//! Viewing-history CSV loader.
//!
//! The export has a header row with at least `Title` and `Date` columns.
//! An optional `Type` column (`Movie` / `TvShow`) tags each row; when it is
//! missing the tag is read from the title shape streaming exports use
//! (`Show: Season 1: Episode Name`).

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::config::ImportConfig;
use crate::error::LookbackError;
use crate::models::{RawRecord, WatchKind};

pub const TITLE_COLUMN: &str = "Title";
pub const DATE_COLUMN: &str = "Date";
pub const TYPE_COLUMN: &str = "Type";

/// Second title segments that mark an episodic row (`Show: Season 2`).
/// `Part`, `Volume` and the like are left out: two-part titles using them
/// are far more often sequels (`Dune: Part Two`) than episodes.
const EPISODE_MARKERS: &[&str] = &["Season", "Series", "Limited Series"];

/// Parses a CSV blob into [`RawRecord`]s.
#[derive(Debug, Clone)]
pub struct ImportLoader {
    date_formats: Vec<String>,
}

impl ImportLoader {
    pub fn new(date_formats: Vec<String>) -> Self {
        Self { date_formats }
    }

    pub fn from_config(config: &ImportConfig) -> Self {
        Self::new(config.date_formats.clone())
    }

    /// Parse the blob. Rows missing a column or carrying an unreadable date
    /// are skipped; a header without `Title` or `Date` fails the whole import.
    pub fn load(&self, csv_text: &str) -> Result<Vec<RawRecord>, LookbackError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(csv_text.as_bytes());

        let headers = reader.headers()?.clone();
        let column = |name: &str| headers.iter().position(|h| h == name);
        let title_idx = column(TITLE_COLUMN)
            .ok_or_else(|| LookbackError::Import(format!("missing `{TITLE_COLUMN}` column")))?;
        let date_idx = column(DATE_COLUMN)
            .ok_or_else(|| LookbackError::Import(format!("missing `{DATE_COLUMN}` column")))?;
        let type_idx = column(TYPE_COLUMN);

        let mut records = Vec::new();
        for result in reader.records() {
            let row = match result {
                Ok(r) => r,
                Err(e) => {
                    warn!("Skipping malformed import row: {e}");
                    continue;
                }
            };
            let line = row.position().map(|p| p.line()).unwrap_or_default();

            let (Some(title), Some(date)) = (row.get(title_idx), row.get(date_idx)) else {
                debug!(line, "Skipping row with missing columns");
                continue;
            };
            if title.is_empty() {
                debug!(line, "Skipping row with empty title");
                continue;
            }

            let Some(watched_date) = self.parse_date(date) else {
                warn!(line, date, "Skipping row with unreadable date");
                continue;
            };

            let tagged = type_idx
                .and_then(|idx| row.get(idx))
                .and_then(WatchKind::from_type_column);
            let (title, kind) = match tagged {
                Some(kind) => (title.to_string(), kind),
                None => classify_title(title),
            };

            records.push(RawRecord {
                title,
                watched_date,
                kind,
            });
        }

        debug!(count = records.len(), "Loaded import rows");
        Ok(records)
    }

    fn parse_date(&self, raw: &str) -> Option<NaiveDate> {
        let raw = raw.trim();
        self.date_formats
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
    }
}

impl Default for ImportLoader {
    fn default() -> Self {
        Self::from_config(&crate::config::AppConfig::default().import)
    }
}

/// Derive the tag from an untagged title. Episodic rows are renamed to the
/// show title (the first segment) so every episode groups under one key.
pub fn classify_title(title: &str) -> (String, WatchKind) {
    let parts: Vec<&str> = title.split(": ").collect();
    let episodic = match parts.as_slice() {
        [_, _, _, ..] => true,
        [_, second] => EPISODE_MARKERS.iter().any(|m| second.starts_with(m)),
        _ => false,
    };

    if episodic {
        (parts[0].to_string(), WatchKind::TvShow)
    } else {
        (title.to_string(), WatchKind::Movie)
    }
}
