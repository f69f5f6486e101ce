use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use lookback_api::{MovieDetails, ShowDetails};

/// Identifies one import run. Increases by one every time a run starts.
pub type RunId = u64;

/// A movie watch merged with its catalog record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedMovie {
    #[serde(flatten)]
    pub details: MovieDetails,
    pub viewed_date: NaiveDate,
}

/// A show merged with its catalog record and the number of episodes watched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedShow {
    #[serde(flatten)]
    pub details: ShowDetails,
    pub watched_episodes: u32,
}

/// Everything resolved so far for the current run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateState {
    pub run_id: RunId,
    pub movies: Vec<EnrichedMovie>,
    pub tvshows: Vec<EnrichedShow>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadPhase {
    /// No run has started yet.
    #[default]
    Idle,
    Loading,
    /// Both flows finished or aborted; the aggregate no longer changes.
    Complete,
}

/// Why an item produced no enriched entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnresolvedReason {
    /// The search returned no candidates.
    NoMatch,
    /// Candidates came back but none carried exactly the queried title.
    NoExactMatch,
}

impl std::fmt::Display for UnresolvedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoMatch => write!(f, "no search results"),
            Self::NoExactMatch => write!(f, "no exact title match"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnresolvedItem {
    pub title: String,
    pub reason: UnresolvedReason,
}

/// Progress of one flow within a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowProgress {
    pub expected: usize,
    pub resolved: usize,
    pub unresolved: Vec<UnresolvedItem>,
    pub finished: bool,
    /// Set when the flow stopped early on a catalog failure.
    pub aborted: Option<String>,
}

impl FlowProgress {
    pub fn new(expected: usize) -> Self {
        Self {
            expected,
            ..Default::default()
        }
    }

    pub fn is_done(&self) -> bool {
        self.finished || self.aborted.is_some()
    }

    /// Items that have produced an outcome, resolved or not.
    pub fn processed(&self) -> usize {
        self.resolved + self.unresolved.len()
    }
}

/// The loading-status record published next to [`AggregateState`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadingState {
    pub run_id: RunId,
    pub phase: LoadPhase,
    pub movies: FlowProgress,
    pub tvshows: FlowProgress,
}

impl LoadingState {
    pub fn is_complete(&self) -> bool {
        self.phase == LoadPhase::Complete
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enriched_movie_serializes_flat() {
        let movie = EnrichedMovie {
            details: MovieDetails {
                id: 27205,
                title: "Inception".into(),
                original_title: None,
                overview: None,
                release_date: None,
                runtime: Some(148),
                genres: vec![],
                poster_path: None,
                vote_average: None,
                imdb_id: None,
            },
            viewed_date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
        };

        let json = serde_json::to_value(&movie).unwrap();
        assert_eq!(json["id"], 27205);
        assert_eq!(json["runtime"], 148);
        assert_eq!(json["viewed_date"], "2024-01-10");
    }

    #[test]
    fn test_flow_progress_done() {
        let mut p = FlowProgress::new(2);
        assert!(!p.is_done());
        p.aborted = Some("timeout".into());
        assert!(p.is_done());
    }
}
