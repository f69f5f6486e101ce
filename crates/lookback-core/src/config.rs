use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::LookbackError;

const DEFAULT_CONFIG: &str = include_str!("../../../config/default.toml");

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub catalog: CatalogConfig,
    pub import: ImportConfig,
    pub resolver: ResolverConfig,
}

/// Connection settings for the TMDB catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub api_base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    /// `chrono` format strings tried in order for the `Date` column.
    pub date_formats: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Total attempts per catalog call, including the first one.
    pub max_attempts: u32,
    pub retry_delay_ms: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

impl AppConfig {
    /// Load config: user file if it exists, otherwise the built-in defaults.
    pub fn load() -> Result<Self, LookbackError> {
        Self::load_from(&Self::config_path())
    }

    /// Load config from an explicit path, falling back to defaults when absent.
    pub fn load_from(path: &Path) -> Result<Self, LookbackError> {
        if !path.exists() {
            return toml::from_str(DEFAULT_CONFIG).map_err(|e| LookbackError::Config(e.to_string()));
        }
        let user_str =
            std::fs::read_to_string(path).map_err(|e| LookbackError::Config(e.to_string()))?;
        toml::from_str(&user_str).map_err(|e| LookbackError::Config(e.to_string()))
    }

    /// Save current config to the user config file.
    pub fn save(&self) -> Result<(), LookbackError> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), LookbackError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| LookbackError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Path to user config file (XDG on Linux, AppData on Windows).
    pub fn config_path() -> PathBuf {
        Self::project_dirs()
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// Path to the database file.
    pub fn db_path() -> PathBuf {
        Self::project_dirs()
            .map(|d| d.data_dir().join("lookback.db"))
            .unwrap_or_else(|| PathBuf::from("lookback.db"))
    }

    /// Ensure the data directory exists and return the DB path.
    pub fn ensure_db_path() -> Result<PathBuf, LookbackError> {
        let path = Self::db_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(path)
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", "lookback")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("built-in default config is valid TOML")
    }
}
