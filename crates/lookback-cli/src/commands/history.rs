use crate::commands::open_db;
use crate::error::CliError;

pub(crate) async fn run_history(limit: usize) -> Result<(), CliError> {
    let runs = open_db()?.recent_runs(limit).await?;
    if runs.is_empty() {
        println!("No import runs yet");
        return Ok(());
    }

    println!(
        "{:>4}  {:<20}  {:<10}  {:>6}  {:>6}  {:>6}  {:>5}",
        "id", "started", "since", "rows", "recent", "movies", "shows"
    );
    for run in runs {
        println!(
            "{:>4}  {:<20}  {:<10}  {:>6}  {:>6}  {:>6}  {:>5}",
            run.id,
            run.started_at.format("%Y-%m-%d %H:%M:%S"),
            run.window_start,
            run.rows_loaded,
            run.rows_in_window,
            run.movies,
            run.shows,
        );
    }
    Ok(())
}
