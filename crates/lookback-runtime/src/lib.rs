//! Async import pipeline: catalog resolution flows, the accumulator that
//! merges their results, and the publisher consumers subscribe to.

pub mod accumulator;
mod db;
pub mod publisher;
pub mod resolver;
pub mod state;
pub mod summary;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use chrono::{Local, NaiveDate, Utc};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use lookback_api::CatalogService;
use lookback_core::classify::{classify, Classified};
use lookback_core::config::AppConfig;
use lookback_core::error::LookbackError;
use lookback_core::import::ImportLoader;
use lookback_core::models::ImportRun;
use lookback_core::window::{filter_recent, window_start};

pub use accumulator::AccumulatorHandle;
pub use db::DbHandle;
pub use publisher::StatePublisher;
pub use resolver::{Resolution, RetryPolicy};
pub use state::{
    AggregateState, EnrichedMovie, EnrichedShow, FlowProgress, LoadPhase, LoadingState, RunId,
    UnresolvedItem, UnresolvedReason,
};
pub use summary::{TimeSpent, TitleTime};

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Core(#[from] LookbackError),
    #[error("import pipeline stopped")]
    Closed,
    #[error("run {0} has not started")]
    UnknownRun(RunId),
}

/// Owns the import store, the publisher and the flows of the current run.
pub struct Runtime<C> {
    db: DbHandle,
    config: AppConfig,
    catalog: Arc<C>,
    publisher: Arc<StatePublisher>,
    accumulator: AccumulatorHandle,
    flows: Mutex<Vec<JoinHandle<()>>>,
}

impl<C: CatalogService + 'static> Runtime<C> {
    /// Must be called inside a tokio runtime.
    pub fn new(config: AppConfig, catalog: C, db: DbHandle) -> Self {
        let publisher = Arc::new(StatePublisher::new());
        let accumulator = AccumulatorHandle::spawn(publisher.clone());
        Self {
            db,
            config,
            catalog: Arc::new(catalog),
            publisher,
            accumulator,
            flows: Mutex::new(Vec::new()),
        }
    }

    /// Open the database at the configured location.
    pub fn open(config: AppConfig, catalog: C) -> Result<Self, RuntimeError> {
        let db_path = AppConfig::ensure_db_path()?;
        let db = DbHandle::open(&db_path)?;
        Ok(Self::new(config, catalog, db))
    }

    /// Replace the stored viewing history.
    pub async fn store_import(&self, csv: String) -> Result<(), RuntimeError> {
        self.db.save_viewing_history(csv).await?;
        Ok(())
    }

    /// Returns `false` if nothing was stored.
    pub async fn clear_import(&self) -> Result<bool, RuntimeError> {
        Ok(self.db.clear_viewing_history().await?)
    }

    pub async fn start_import(&self) -> Result<RunId, RuntimeError> {
        self.start_import_at(Local::now().date_naive()).await
    }

    /// Start a run against the stored history with `today` as the window
    /// anchor. The previous run's flows are cancelled and the aggregate is
    /// emptied before any catalog call is made.
    pub async fn start_import_at(&self, today: NaiveDate) -> Result<RunId, RuntimeError> {
        let records = match self.db.viewing_history().await? {
            Some(csv) => ImportLoader::from_config(&self.config.import).load(&csv)?,
            None => {
                warn!("No viewing history stored, starting an empty run");
                Vec::new()
            }
        };
        let rows_loaded = records.len();
        let recent = filter_recent(records, today);
        let rows_in_window = recent.len();
        let Classified { movies, shows } = classify(recent);

        let mut flows = self.flows.lock().await;
        for handle in flows.drain(..) {
            handle.abort();
        }

        let run_id = self
            .accumulator
            .begin_run(movies.len(), shows.len())
            .await
            .ok_or(RuntimeError::Closed)?;
        info!(
            run_id,
            rows_loaded,
            rows_in_window,
            movies = movies.len(),
            shows = shows.len(),
            "Import run started"
        );

        let run = ImportRun {
            id: 0,
            started_at: Utc::now(),
            window_start: window_start(today),
            rows_loaded: saturating_count(rows_loaded),
            rows_in_window: saturating_count(rows_in_window),
            movies: saturating_count(movies.len()),
            shows: saturating_count(shows.len()),
        };
        if let Err(e) = self.db.record_run(run).await {
            warn!(error = %e, "Failed to record import run");
        }

        let policy = RetryPolicy::from(&self.config.resolver);
        flows.push(tokio::spawn(resolver::run_movie_flow(
            self.catalog.clone(),
            movies,
            policy,
            self.accumulator.sink(run_id),
        )));
        flows.push(tokio::spawn(resolver::run_show_flow(
            self.catalog.clone(),
            shows,
            policy,
            self.accumulator.sink(run_id),
        )));

        Ok(run_id)
    }

    /// Wait until `run_id` completes or a newer run replaces it. Fails
    /// right away for an id no run has been given yet.
    pub async fn wait_for_run(&self, run_id: RunId) -> Result<LoadingState, RuntimeError> {
        let mut rx = self.publisher.subscribe_loading();
        if run_id > rx.borrow().run_id {
            return Err(RuntimeError::UnknownRun(run_id));
        }
        let loading = rx
            .wait_for(|l| l.run_id > run_id || (l.run_id == run_id && l.is_complete()))
            .await
            .map_err(|_| RuntimeError::Closed)?;
        Ok(loading.clone())
    }

    pub fn subscribe_state(&self) -> watch::Receiver<AggregateState> {
        self.publisher.subscribe_state()
    }

    pub fn subscribe_loading(&self) -> watch::Receiver<LoadingState> {
        self.publisher.subscribe_loading()
    }

    pub fn snapshot(&self) -> AggregateState {
        self.publisher.snapshot()
    }

    pub fn loading(&self) -> LoadingState {
        self.publisher.loading()
    }

    /// Summary of the aggregate as it stands now.
    pub fn time_spent(&self) -> TimeSpent {
        TimeSpent::from_state(&self.publisher.snapshot())
    }

    /// Newest first.
    pub async fn recent_runs(&self, limit: usize) -> Result<Vec<ImportRun>, RuntimeError> {
        Ok(self.db.recent_runs(limit).await?)
    }
}

fn saturating_count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}
