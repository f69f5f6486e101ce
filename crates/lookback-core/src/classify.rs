use std::collections::HashMap;

use crate::models::{RawRecord, ShowAggregate, ViewingEvent, WatchKind};

/// Records split into the two resolution streams.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classified {
    /// Individual movie watches, in import order.
    pub movies: Vec<ViewingEvent>,
    /// One entry per distinct show title, in first-appearance order.
    pub shows: Vec<ShowAggregate>,
}

/// Partition records by kind and collapse episodes by exact title.
pub fn classify(records: Vec<RawRecord>) -> Classified {
    let mut movies = Vec::new();
    let mut shows: Vec<ShowAggregate> = Vec::new();
    let mut show_index: HashMap<String, usize> = HashMap::new();

    for record in records {
        match record.kind {
            WatchKind::Movie => movies.push(ViewingEvent::from(record)),
            WatchKind::TvShow => match show_index.get(&record.title) {
                Some(&idx) => shows[idx].watched_episode_count += 1,
                None => {
                    show_index.insert(record.title.clone(), shows.len());
                    shows.push(ShowAggregate {
                        title: record.title,
                        watched_episode_count: 1,
                    });
                }
            },
        }
    }

    Classified { movies, shows }
}
