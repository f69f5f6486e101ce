//! lookback CLI
//!
//! Imports a viewing-history export, resolves it against TMDB and reports
//! the time spent per title over the last year.

mod commands;
mod error;

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use lookback_core::config::AppConfig;

use crate::error::CliError;

#[derive(Parser)]
#[command(name = "lookback")]
#[command(about = "Summarize a year of viewing history", long_about = None)]
struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file to use instead of the platform default
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// TMDB API key (overrides the config file)
    #[arg(long, global = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store a viewing-history CSV export for later runs
    Import {
        /// CSV file with `Title` and `Date` columns
        file: PathBuf,
    },

    /// Resolve the stored history and print the summary
    Run {
        /// Print the full result as JSON
        #[arg(long)]
        json: bool,

        /// Anchor the one-year window on this date (YYYY-MM-DD)
        #[arg(long)]
        today: Option<NaiveDate>,
    },

    /// List recent import runs
    History {
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },

    /// Remove the stored viewing history
    Clear,

    /// Print the effective configuration
    Config {
        /// Print only the config file path
        #[arg(long)]
        path: bool,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "lookback=debug" } else { "lookback=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<AppConfig, CliError> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };
    if let Some(key) = &cli.api_key {
        config.catalog.api_key = key.clone();
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match dispatch(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn dispatch(cli: Cli) -> Result<(), CliError> {
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Import { file } => commands::import::run_import(&config.import, &file).await,
        Commands::Run { json, today } => commands::run::run_resolve(config, today, json).await,
        Commands::History { limit } => commands::history::run_history(limit).await,
        Commands::Clear => commands::import::run_clear().await,
        Commands::Config { path } => {
            commands::config::run_config(&config, cli.config.as_deref(), path)
        }
    }
}
