use std::time::Duration;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use lookback_api::tmdb::TmdbClient;
use lookback_core::config::AppConfig;
use lookback_runtime::{AggregateState, FlowProgress, LoadingState, Runtime, TimeSpent};

use crate::error::CliError;

#[derive(Serialize)]
struct RunReport<'a> {
    state: &'a AggregateState,
    loading: &'a LoadingState,
    time_spent: &'a TimeSpent,
}

/// Resolve the stored history and print the summary once both flows are done.
pub(crate) async fn run_resolve(
    config: AppConfig,
    today: Option<NaiveDate>,
    json: bool,
) -> Result<(), CliError> {
    let catalog = TmdbClient::with_base_url(
        config.catalog.api_key.clone(),
        &config.catalog.api_base_url,
        Duration::from_secs(config.catalog.timeout_secs),
    )?;
    let runtime = Runtime::open(config, catalog)?;

    let run_id = match today {
        Some(today) => runtime.start_import_at(today).await?,
        None => runtime.start_import().await?,
    };

    let mut rx = runtime.subscribe_loading();
    let progress = tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let loading = rx.borrow_and_update().clone();
            if loading.run_id != run_id || loading.is_complete() {
                break;
            }
            info!(
                movies = %progress_label(&loading.movies),
                shows = %progress_label(&loading.tvshows),
                "Resolving"
            );
        }
    });

    let loading = runtime.wait_for_run(run_id).await?;
    progress.abort();
    let state = runtime.snapshot();
    let spent = TimeSpent::from_state(&state);

    if json {
        let report = RunReport {
            state: &state,
            loading: &loading,
            time_spent: &spent,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&spent, &loading);
    }
    Ok(())
}

fn progress_label(p: &FlowProgress) -> String {
    format!("{}/{}", p.processed(), p.expected)
}

fn print_summary(spent: &TimeSpent, loading: &LoadingState) {
    println!(
        "Time spent: {} (movies {}, shows {})",
        TimeSpent::format_minutes(spent.total_minutes),
        TimeSpent::format_minutes(spent.movie_minutes),
        TimeSpent::format_minutes(spent.show_minutes),
    );
    for entry in &spent.per_title {
        println!(
            "  {:>8}  {:<7}  {}",
            TimeSpent::format_minutes(entry.minutes),
            entry.kind.as_str(),
            entry.title
        );
    }

    for (label, flow) in [("movies", &loading.movies), ("shows", &loading.tvshows)] {
        if let Some(error) = &flow.aborted {
            println!(
                "Resolving {label} stopped after {}/{}: {error}",
                flow.processed(),
                flow.expected
            );
        }
        for item in &flow.unresolved {
            println!("Unresolved ({label}): {} [{}]", item.title, item.reason);
        }
    }
}
