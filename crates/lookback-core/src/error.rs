use thiserror::Error;

#[derive(Debug, Error)]
pub enum LookbackError {
    #[error("import failed: {0}")]
    Import(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("storage actor closed")]
    ActorClosed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
