use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Whether a history row is a feature-length watch or one episode of a show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WatchKind {
    Movie,
    TvShow,
}

impl WatchKind {
    /// Value used in the import's `Type` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Movie => "Movie",
            Self::TvShow => "TvShow",
        }
    }

    /// Parse the `Type` column. Matching is case-sensitive, like the headers.
    pub fn from_type_column(s: &str) -> Option<Self> {
        match s {
            "Movie" => Some(Self::Movie),
            "TvShow" => Some(Self::TvShow),
            _ => None,
        }
    }
}

impl std::fmt::Display for WatchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the viewing-history import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    pub title: String,
    pub watched_date: NaiveDate,
    pub kind: WatchKind,
}

/// A classified watch, ready for catalog resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewingEvent {
    pub title: String,
    pub watched_date: NaiveDate,
    pub kind: WatchKind,
}

impl From<RawRecord> for ViewingEvent {
    fn from(record: RawRecord) -> Self {
        Self {
            title: record.title,
            watched_date: record.watched_date,
            kind: record.kind,
        }
    }
}

/// All episodes of one show collapsed into a single count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowAggregate {
    pub title: String,
    pub watched_episode_count: u32,
}
