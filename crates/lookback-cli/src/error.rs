use thiserror::Error;

use lookback_api::tmdb::TmdbError;
use lookback_core::error::LookbackError;
use lookback_runtime::RuntimeError;

/// Errors that can occur during CLI command execution.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] LookbackError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error("TMDB: {0}")]
    Catalog(#[from] TmdbError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),
}
