pub(crate) mod config;
pub(crate) mod history;
pub(crate) mod import;
pub(crate) mod run;

use lookback_core::config::AppConfig;
use lookback_runtime::DbHandle;

use crate::error::CliError;

/// Handle to the database at the platform data location.
pub(crate) fn open_db() -> Result<DbHandle, CliError> {
    let path = AppConfig::ensure_db_path()?;
    tracing::debug!(path = %path.display(), "Opening database");
    Ok(DbHandle::open(&path)?)
}
