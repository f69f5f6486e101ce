use tokio::sync::watch;

use crate::state::{
    AggregateState, EnrichedMovie, EnrichedShow, FlowProgress, LoadPhase, LoadingState, RunId,
};

/// Holds the two observable values consumers read: the aggregate and the
/// loading status. Writes go through the accumulator only.
#[derive(Debug)]
pub struct StatePublisher {
    state: watch::Sender<AggregateState>,
    loading: watch::Sender<LoadingState>,
}

impl Default for StatePublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl StatePublisher {
    pub fn new() -> Self {
        let (state, _) = watch::channel(AggregateState::default());
        let (loading, _) = watch::channel(LoadingState::default());
        Self { state, loading }
    }

    pub fn subscribe_state(&self) -> watch::Receiver<AggregateState> {
        self.state.subscribe()
    }

    pub fn subscribe_loading(&self) -> watch::Receiver<LoadingState> {
        self.loading.subscribe()
    }

    /// Current aggregate.
    pub fn snapshot(&self) -> AggregateState {
        self.state.borrow().clone()
    }

    pub fn loading(&self) -> LoadingState {
        self.loading.borrow().clone()
    }

    /// Empty the aggregate and announce loading for `run_id`.
    pub(crate) fn reset(&self, run_id: RunId, expected_movies: usize, expected_shows: usize) {
        self.state.send_replace(AggregateState {
            run_id,
            ..Default::default()
        });
        self.loading.send_replace(LoadingState {
            run_id,
            phase: LoadPhase::Loading,
            movies: FlowProgress::new(expected_movies),
            tvshows: FlowProgress::new(expected_shows),
        });
    }

    pub(crate) fn push_movie(&self, movie: EnrichedMovie) {
        self.state.send_modify(|s| s.movies.push(movie));
    }

    pub(crate) fn push_show(&self, show: EnrichedShow) {
        self.state.send_modify(|s| s.tvshows.push(show));
    }

    pub(crate) fn update_loading(&self, f: impl FnOnce(&mut LoadingState)) {
        self.loading.send_modify(f);
    }
}
