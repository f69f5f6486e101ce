use std::path::Path;

use tokio::sync::{mpsc, oneshot};

use lookback_core::error::LookbackError;
use lookback_core::models::ImportRun;
use lookback_core::storage::Storage;

/// Async handle to the SQLite storage, which lives on its own thread.
#[derive(Clone)]
pub struct DbHandle {
    tx: mpsc::UnboundedSender<DbCommand>,
}

enum DbCommand {
    SaveViewingHistory {
        csv: String,
        reply: oneshot::Sender<Result<(), LookbackError>>,
    },
    ViewingHistory {
        reply: oneshot::Sender<Result<Option<String>, LookbackError>>,
    },
    ClearViewingHistory {
        reply: oneshot::Sender<Result<bool, LookbackError>>,
    },
    RecordRun {
        run: ImportRun,
        reply: oneshot::Sender<Result<i64, LookbackError>>,
    },
    RecentRuns {
        limit: usize,
        reply: oneshot::Sender<Result<Vec<ImportRun>, LookbackError>>,
    },
}

impl DbHandle {
    pub fn open(path: &Path) -> Result<Self, LookbackError> {
        let storage = Storage::open(path).inspect_err(|e| {
            tracing::error!("Failed to open database: {e}");
        })?;
        Self::spawn(storage)
    }

    /// Handle backed by an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, LookbackError> {
        Self::spawn(Storage::open_memory()?)
    }

    fn spawn(storage: Storage) -> Result<Self, LookbackError> {
        let (tx, rx) = mpsc::unbounded_channel();

        std::thread::Builder::new()
            .name("db-actor".into())
            .spawn(move || actor_loop(storage, rx))?;

        Ok(Self { tx })
    }

    pub async fn save_viewing_history(&self, csv: String) -> Result<(), LookbackError> {
        let (reply, rx) = oneshot::channel();
        let _ = self.tx.send(DbCommand::SaveViewingHistory { csv, reply });
        rx.await.unwrap_or(Err(LookbackError::ActorClosed))
    }

    pub async fn viewing_history(&self) -> Result<Option<String>, LookbackError> {
        let (reply, rx) = oneshot::channel();
        let _ = self.tx.send(DbCommand::ViewingHistory { reply });
        rx.await.unwrap_or(Err(LookbackError::ActorClosed))
    }

    pub async fn clear_viewing_history(&self) -> Result<bool, LookbackError> {
        let (reply, rx) = oneshot::channel();
        let _ = self.tx.send(DbCommand::ClearViewingHistory { reply });
        rx.await.unwrap_or(Err(LookbackError::ActorClosed))
    }

    pub async fn record_run(&self, run: ImportRun) -> Result<i64, LookbackError> {
        let (reply, rx) = oneshot::channel();
        let _ = self.tx.send(DbCommand::RecordRun { run, reply });
        rx.await.unwrap_or(Err(LookbackError::ActorClosed))
    }

    pub async fn recent_runs(&self, limit: usize) -> Result<Vec<ImportRun>, LookbackError> {
        let (reply, rx) = oneshot::channel();
        let _ = self.tx.send(DbCommand::RecentRuns { limit, reply });
        rx.await.unwrap_or(Err(LookbackError::ActorClosed))
    }
}

fn actor_loop(storage: Storage, mut rx: mpsc::UnboundedReceiver<DbCommand>) {
    while let Some(cmd) = rx.blocking_recv() {
        match cmd {
            DbCommand::SaveViewingHistory { csv, reply } => {
                let _ = reply.send(storage.save_viewing_history(&csv));
            }
            DbCommand::ViewingHistory { reply } => {
                let _ = reply.send(storage.viewing_history());
            }
            DbCommand::ClearViewingHistory { reply } => {
                let _ = reply.send(storage.delete_value(lookback_core::storage::VIEWING_HISTORY_KEY));
            }
            DbCommand::RecordRun { run, reply } => {
                let _ = reply.send(storage.record_run(&run));
            }
            DbCommand::RecentRuns { limit, reply } => {
                let _ = reply.send(storage.recent_runs(limit));
            }
        }
    }
    tracing::debug!("DB actor stopped");
}
