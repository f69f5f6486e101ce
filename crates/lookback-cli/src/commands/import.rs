use std::path::Path;

use tracing::info;

use lookback_core::config::ImportConfig;
use lookback_core::import::ImportLoader;

use crate::commands::open_db;
use crate::error::CliError;

/// Validate the export and store it under the viewing-history key.
pub(crate) async fn run_import(config: &ImportConfig, file: &Path) -> Result<(), CliError> {
    let csv = std::fs::read_to_string(file)?;
    // Reject files the loader cannot read at all before replacing the old blob.
    let rows = count_rows(config, &csv)?;

    open_db()?.save_viewing_history(csv).await?;
    info!(file = %file.display(), rows, "Viewing history stored");
    println!("Stored {rows} rows from {}", file.display());
    Ok(())
}

/// Rows `lookback run` will be able to read with the same settings.
fn count_rows(config: &ImportConfig, csv: &str) -> Result<usize, CliError> {
    Ok(ImportLoader::from_config(config).load(csv)?.len())
}

pub(crate) async fn run_clear() -> Result<(), CliError> {
    if open_db()?.clear_viewing_history().await? {
        println!("Viewing history removed");
    } else {
        println!("No viewing history stored");
    }
    Ok(())
}
