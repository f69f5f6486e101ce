//! Catalog resolution for the movie and show flows.
//!
//! Each flow is a single worker that walks its queue in order: an item's
//! search and details calls both complete before the next item's search
//! starts. The two flows run concurrently with each other.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use lookback_api::{CatalogCandidate, CatalogService};
use lookback_core::config::ResolverConfig;
use lookback_core::models::{ShowAggregate, ViewingEvent};

use crate::accumulator::{FlowEvent, FlowKind, FlowSink};
use crate::state::{EnrichedMovie, EnrichedShow, UnresolvedItem, UnresolvedReason};

/// Outcome for one queued item.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<T> {
    Resolved(T),
    Unresolved(UnresolvedItem),
}

impl<T> Resolution<T> {
    fn unresolved(title: &str, reason: UnresolvedReason) -> Self {
        Self::Unresolved(UnresolvedItem {
            title: title.to_string(),
            reason,
        })
    }
}

/// How often a failing catalog call is repeated.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts including the first; values below 1 act as 1.
    pub max_attempts: u32,
    /// Wait before retry `n` is `n * delay`.
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            delay: Duration::ZERO,
        }
    }
}

impl From<&ResolverConfig> for RetryPolicy {
    fn from(config: &ResolverConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            delay: Duration::from_millis(config.retry_delay_ms),
        }
    }
}

/// Run `call` until it succeeds, fails permanently, or attempts run out.
async fn with_retry<T, E, F, Fut>(
    policy: RetryPolicy,
    label: &str,
    is_transient: fn(&E) -> bool,
    mut call: F,
) -> Result<T, E>
where
    E: std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 1;
    loop {
        match call().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < policy.max_attempts && is_transient(&e) => {
                warn!(label, attempt, error = %e, "Catalog call failed, retrying");
                tokio::time::sleep(policy.delay * attempt).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// First candidate whose display title equals `title` exactly.
pub fn pick_exact_title(candidates: Vec<CatalogCandidate>, title: &str) -> Option<CatalogCandidate> {
    candidates.into_iter().find(|c| c.title == title)
}

/// Search, keep exact-title hits, take the first, fetch its details.
pub async fn resolve_movie<C: CatalogService>(
    catalog: &C,
    event: &ViewingEvent,
    policy: RetryPolicy,
) -> Result<Resolution<EnrichedMovie>, C::Error> {
    let candidates = with_retry(policy, "search movie", C::is_transient, || {
        catalog.search_movies(&event.title)
    })
    .await?;

    let reason = if candidates.is_empty() {
        UnresolvedReason::NoMatch
    } else {
        UnresolvedReason::NoExactMatch
    };
    let Some(pick) = pick_exact_title(candidates, &event.title) else {
        return Ok(Resolution::unresolved(&event.title, reason));
    };

    debug!(title = %event.title, id = pick.id, "Movie matched");
    let details = with_retry(policy, "movie details", C::is_transient, || {
        catalog.movie_details(pick.id)
    })
    .await?;

    Ok(Resolution::Resolved(EnrichedMovie {
        details,
        viewed_date: event.watched_date,
    }))
}

/// Search and take the first raw candidate. Unlike movies, show hits are
/// not filtered by exact title.
pub async fn resolve_show<C: CatalogService>(
    catalog: &C,
    show: &ShowAggregate,
    policy: RetryPolicy,
) -> Result<Resolution<EnrichedShow>, C::Error> {
    let candidates = with_retry(policy, "search show", C::is_transient, || {
        catalog.search_shows(&show.title)
    })
    .await?;

    let Some(pick) = candidates.into_iter().next() else {
        return Ok(Resolution::unresolved(&show.title, UnresolvedReason::NoMatch));
    };

    debug!(title = %show.title, id = pick.id, matched = %pick.title, "Show matched");
    let details = with_retry(policy, "show details", C::is_transient, || {
        catalog.show_details(pick.id)
    })
    .await?;

    Ok(Resolution::Resolved(EnrichedShow {
        details,
        watched_episodes: show.watched_episode_count,
    }))
}

/// Movie worker. A catalog failure stops this flow only.
pub async fn run_movie_flow<C: CatalogService>(
    catalog: Arc<C>,
    events: Vec<ViewingEvent>,
    policy: RetryPolicy,
    sink: FlowSink,
) {
    info!(run_id = sink.run_id(), count = events.len(), "Movie flow started");
    for event in &events {
        match resolve_movie(catalog.as_ref(), event, policy).await {
            Ok(resolution) => {
                if !sink.send(FlowEvent::Movie(resolution)) {
                    return;
                }
            }
            Err(e) => {
                warn!(title = %event.title, error = %e, "Movie flow stopped");
                sink.send(FlowEvent::Aborted(FlowKind::Movies, e.to_string()));
                return;
            }
        }
    }
    sink.send(FlowEvent::Finished(FlowKind::Movies));
}

/// Show worker. A catalog failure stops this flow only.
pub async fn run_show_flow<C: CatalogService>(
    catalog: Arc<C>,
    shows: Vec<ShowAggregate>,
    policy: RetryPolicy,
    sink: FlowSink,
) {
    info!(run_id = sink.run_id(), count = shows.len(), "Show flow started");
    for show in &shows {
        match resolve_show(catalog.as_ref(), show, policy).await {
            Ok(resolution) => {
                if !sink.send(FlowEvent::Show(resolution)) {
                    return;
                }
            }
            Err(e) => {
                warn!(title = %show.title, error = %e, "Show flow stopped");
                sink.send(FlowEvent::Aborted(FlowKind::Shows, e.to_string()));
                return;
            }
        }
    }
    sink.send(FlowEvent::Finished(FlowKind::Shows));
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::testing::{FakeCatalog, FakeError};

    fn event(title: &str) -> ViewingEvent {
        ViewingEvent {
            title: title.into(),
            watched_date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            kind: lookback_core::models::WatchKind::Movie,
        }
    }

    fn show(title: &str, count: u32) -> ShowAggregate {
        ShowAggregate {
            title: title.into(),
            watched_episode_count: count,
        }
    }

    #[tokio::test]
    async fn test_movie_exact_title_filter() {
        let catalog = FakeCatalog::default().with_movie(
            "Heat",
            &[(1, "Heat Wave"), (2, "Heat"), (3, "Heat")],
        );

        let res = resolve_movie(&catalog, &event("Heat"), RetryPolicy::none())
            .await
            .unwrap();
        let Resolution::Resolved(movie) = res else {
            panic!("expected a resolved movie");
        };
        assert_eq!(movie.details.id, 2);
        assert_eq!(movie.viewed_date.to_string(), "2024-02-01");
        assert_eq!(catalog.calls(), vec!["search_movies:Heat", "movie_details:2"]);
    }

    #[tokio::test]
    async fn test_movie_without_exact_match_skips_details() {
        let catalog = FakeCatalog::default().with_movie("heat", &[(1, "Heat")]);

        let res = resolve_movie(&catalog, &event("heat"), RetryPolicy::none())
            .await
            .unwrap();
        assert_eq!(
            res,
            Resolution::unresolved("heat", UnresolvedReason::NoExactMatch)
        );
        assert_eq!(catalog.calls(), vec!["search_movies:heat"]);
    }

    #[tokio::test]
    async fn test_empty_search_is_no_match() {
        let catalog = FakeCatalog::default();

        let movie = resolve_movie(&catalog, &event("Ghost"), RetryPolicy::none())
            .await
            .unwrap();
        assert_eq!(
            movie,
            Resolution::unresolved("Ghost", UnresolvedReason::NoMatch)
        );

        let tv = resolve_show(&catalog, &show("Ghost", 2), RetryPolicy::none())
            .await
            .unwrap();
        assert_eq!(tv, Resolution::unresolved("Ghost", UnresolvedReason::NoMatch));
    }

    #[tokio::test]
    async fn test_show_takes_first_raw_candidate() {
        let catalog = FakeCatalog::default()
            .with_show("Office", &[(10, "The Office"), (11, "Office")])
            .with_runtime(10, 22);

        let res = resolve_show(&catalog, &show("Office", 4), RetryPolicy::none())
            .await
            .unwrap();
        let Resolution::Resolved(tv) = res else {
            panic!("expected a resolved show");
        };
        assert_eq!(tv.details.id, 10);
        assert_eq!(tv.watched_episodes, 4);
        assert_eq!(tv.details.episode_minutes(), Some(22));
    }

    #[tokio::test]
    async fn test_details_id_matches_candidate() {
        let catalog = FakeCatalog::default().with_movie("Arrival", &[(329865, "Arrival")]);
        for _ in 0..2 {
            let res = resolve_movie(&catalog, &event("Arrival"), RetryPolicy::none())
                .await
                .unwrap();
            let Resolution::Resolved(movie) = res else {
                panic!("expected a resolved movie");
            };
            assert_eq!(movie.details.id, 329865);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_errors_are_retried() {
        let catalog = FakeCatalog::default()
            .with_movie("Heat", &[(2, "Heat")])
            .flaky("Heat", 2);
        let policy = RetryPolicy {
            max_attempts: 3,
            delay: Duration::from_millis(100),
        };

        let res = resolve_movie(&catalog, &event("Heat"), policy).await.unwrap();
        assert!(matches!(res, Resolution::Resolved(_)));
        assert_eq!(
            catalog.calls(),
            vec![
                "search_movies:Heat",
                "search_movies:Heat",
                "search_movies:Heat",
                "movie_details:2"
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_are_bounded() {
        let catalog = FakeCatalog::default()
            .with_movie("Heat", &[(2, "Heat")])
            .flaky("Heat", 5);
        let policy = RetryPolicy {
            max_attempts: 2,
            delay: Duration::from_millis(10),
        };

        let err = resolve_movie(&catalog, &event("Heat"), policy)
            .await
            .unwrap_err();
        assert!(matches!(err, FakeError::Flaky));
        assert_eq!(catalog.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_permanent_errors_are_not_retried() {
        let catalog = FakeCatalog::default().failing("Heat");
        let policy = RetryPolicy {
            max_attempts: 5,
            delay: Duration::ZERO,
        };

        let err = resolve_movie(&catalog, &event("Heat"), policy)
            .await
            .unwrap_err();
        assert!(matches!(err, FakeError::Unavailable));
        assert_eq!(catalog.calls().len(), 1);
    }
}
