//! Single-writer merge point for both resolution flows.
//!
//! Flows never touch [`AggregateState`](crate::state::AggregateState)
//! directly. They send [`FlowEvent`]s tagged with their run id through a
//! [`FlowSink`]; one actor task applies them in arrival order and drops any
//! event that belongs to a superseded run.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::publisher::StatePublisher;
use crate::resolver::Resolution;
use crate::state::{EnrichedMovie, EnrichedShow, FlowProgress, LoadPhase, RunId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowKind {
    Movies,
    Shows,
}

impl std::fmt::Display for FlowKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Movies => write!(f, "movies"),
            Self::Shows => write!(f, "shows"),
        }
    }
}

#[derive(Debug)]
pub enum FlowEvent {
    Movie(Resolution<EnrichedMovie>),
    Show(Resolution<EnrichedShow>),
    /// Every item of the flow produced an outcome.
    Finished(FlowKind),
    /// The flow stopped on a catalog failure.
    Aborted(FlowKind, String),
}

enum Command {
    Begin {
        expected_movies: usize,
        expected_shows: usize,
        reply: oneshot::Sender<RunId>,
    },
    Event {
        run_id: RunId,
        event: FlowEvent,
    },
}

/// Handle to the accumulator actor.
#[derive(Clone)]
pub struct AccumulatorHandle {
    tx: mpsc::UnboundedSender<Command>,
}

/// Sending half given to one flow; stamps every event with its run id.
#[derive(Clone)]
pub struct FlowSink {
    run_id: RunId,
    tx: mpsc::UnboundedSender<Command>,
}

impl FlowSink {
    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    /// Returns `false` once the accumulator is gone.
    pub fn send(&self, event: FlowEvent) -> bool {
        self.tx
            .send(Command::Event {
                run_id: self.run_id,
                event,
            })
            .is_ok()
    }
}

impl AccumulatorHandle {
    /// Spawn the actor on the current tokio runtime.
    pub fn spawn(publisher: Arc<StatePublisher>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(actor_loop(publisher, rx));
        Self { tx }
    }

    /// Start a new run: the aggregate is emptied and loading is announced
    /// before this returns. Returns `None` if the actor has stopped.
    pub async fn begin_run(&self, expected_movies: usize, expected_shows: usize) -> Option<RunId> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Command::Begin {
                expected_movies,
                expected_shows,
                reply,
            })
            .ok()?;
        rx.await.ok()
    }

    pub fn sink(&self, run_id: RunId) -> FlowSink {
        FlowSink {
            run_id,
            tx: self.tx.clone(),
        }
    }
}

async fn actor_loop(publisher: Arc<StatePublisher>, mut rx: mpsc::UnboundedReceiver<Command>) {
    let mut current: RunId = 0;

    while let Some(cmd) = rx.recv().await {
        match cmd {
            Command::Begin {
                expected_movies,
                expected_shows,
                reply,
            } => {
                current += 1;
                publisher.reset(current, expected_movies, expected_shows);
                debug!(run_id = current, expected_movies, expected_shows, "Run started");
                let _ = reply.send(current);
            }
            Command::Event { run_id, event } if run_id != current => {
                debug!(run_id, current, ?event, "Discarding event from stale run");
            }
            Command::Event { run_id, event } => apply(&publisher, run_id, event),
        }
    }
}

fn apply(publisher: &StatePublisher, run_id: RunId, event: FlowEvent) {
    match event {
        FlowEvent::Movie(Resolution::Resolved(movie)) => {
            debug!(title = %movie.details.title, "Movie resolved");
            publisher.push_movie(movie);
            publisher.update_loading(|l| l.movies.resolved += 1);
        }
        FlowEvent::Movie(Resolution::Unresolved(item)) => {
            warn!(title = %item.title, reason = %item.reason, "Movie unresolved");
            publisher.update_loading(|l| l.movies.unresolved.push(item));
        }
        FlowEvent::Show(Resolution::Resolved(show)) => {
            debug!(title = %show.details.name, "Show resolved");
            publisher.push_show(show);
            publisher.update_loading(|l| l.tvshows.resolved += 1);
        }
        FlowEvent::Show(Resolution::Unresolved(item)) => {
            warn!(title = %item.title, reason = %item.reason, "Show unresolved");
            publisher.update_loading(|l| l.tvshows.unresolved.push(item));
        }
        FlowEvent::Finished(kind) => {
            publisher.update_loading(|l| progress_mut(l, kind).finished = true);
        }
        FlowEvent::Aborted(kind, error) => {
            warn!(flow = %kind, %error, "Flow aborted");
            publisher.update_loading(|l| progress_mut(l, kind).aborted = Some(error));
        }
    }

    publisher.update_loading(|l| {
        if l.phase == LoadPhase::Loading && l.movies.is_done() && l.tvshows.is_done() {
            l.phase = LoadPhase::Complete;
            info!(
                run_id,
                movies = l.movies.resolved,
                shows = l.tvshows.resolved,
                unresolved = l.movies.unresolved.len() + l.tvshows.unresolved.len(),
                "Run complete"
            );
        }
    });
}

fn progress_mut(loading: &mut crate::state::LoadingState, kind: FlowKind) -> &mut FlowProgress {
    match kind {
        FlowKind::Movies => &mut loading.movies,
        FlowKind::Shows => &mut loading.tvshows,
    }
}
