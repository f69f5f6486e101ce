use std::path::Path;

use lookback_core::config::AppConfig;

use crate::error::CliError;

/// Print the config file location, or the effective settings with the API
/// key masked.
pub(crate) fn run_config(
    config: &AppConfig,
    explicit: Option<&Path>,
    path_only: bool,
) -> Result<(), CliError> {
    let path = explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(AppConfig::config_path);
    if path_only {
        println!("{}", path.display());
        return Ok(());
    }

    let mut shown = config.clone();
    shown.catalog.api_key = mask_value(&shown.catalog.api_key);
    let text = toml::to_string_pretty(&shown).map_err(|e| CliError::Config(e.to_string()))?;
    let status = if path.exists() { "exists" } else { "not found, using defaults" };
    println!("# {} ({status})", path.display());
    print!("{text}");
    Ok(())
}

fn mask_value(s: &str) -> String {
    match s.chars().count() {
        0 => String::new(),
        1..=4 => "****".to_string(),
        _ => format!("{}****", s.chars().take(4).collect::<String>()),
    }
}
