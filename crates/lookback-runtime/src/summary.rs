//! Time-spent totals computed from a resolved aggregate.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use lookback_core::models::WatchKind;

use crate::state::AggregateState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleTime {
    pub title: String,
    pub kind: WatchKind,
    pub minutes: u64,
}

/// Minutes spent watching, split by kind and by title.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSpent {
    pub movie_minutes: u64,
    pub show_minutes: u64,
    pub total_minutes: u64,
    /// Largest first; ties ordered by title.
    pub per_title: Vec<TitleTime>,
}

impl TimeSpent {
    /// Movies count their runtime once per viewing. Shows count the first
    /// listed episode length times the episodes watched. Entries without a
    /// known length contribute zero minutes but still appear.
    pub fn from_state(state: &AggregateState) -> Self {
        let mut by_title: HashMap<(String, WatchKind), u64> = HashMap::new();
        let mut movie_minutes = 0;
        let mut show_minutes = 0;

        for movie in &state.movies {
            let minutes = u64::from(movie.details.runtime.unwrap_or(0));
            movie_minutes += minutes;
            *by_title
                .entry((movie.details.title.clone(), WatchKind::Movie))
                .or_default() += minutes;
        }

        for show in &state.tvshows {
            let per_episode = u64::from(show.details.episode_minutes().unwrap_or(0));
            let minutes = per_episode * u64::from(show.watched_episodes);
            show_minutes += minutes;
            *by_title
                .entry((show.details.name.clone(), WatchKind::TvShow))
                .or_default() += minutes;
        }

        let mut per_title: Vec<TitleTime> = by_title
            .into_iter()
            .map(|((title, kind), minutes)| TitleTime {
                title,
                kind,
                minutes,
            })
            .collect();
        per_title.sort_by(|a, b| {
            b.minutes
                .cmp(&a.minutes)
                .then_with(|| a.title.cmp(&b.title))
                .then_with(|| a.kind.as_str().cmp(b.kind.as_str()))
        });

        Self {
            movie_minutes,
            show_minutes,
            total_minutes: movie_minutes + show_minutes,
            per_title,
        }
    }

    /// Format minutes as `"12h 05m"`.
    pub fn format_minutes(minutes: u64) -> String {
        format!("{}h {:02}m", minutes / 60, minutes % 60)
    }
}
