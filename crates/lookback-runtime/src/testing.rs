//! In-memory catalog used by the runtime tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use lookback_api::{CatalogCandidate, CatalogService, MovieDetails, ShowDetails};

#[derive(Debug, thiserror::Error)]
pub enum FakeError {
    #[error("catalog unavailable")]
    Unavailable,
    #[error("temporary failure")]
    Flaky,
}

#[derive(Default)]
pub struct FakeCatalog {
    movie_results: HashMap<String, Vec<CatalogCandidate>>,
    show_results: HashMap<String, Vec<CatalogCandidate>>,
    titles: HashMap<u64, String>,
    runtimes: HashMap<u64, u32>,
    /// Search latency per query.
    delays: HashMap<String, Duration>,
    /// Queries whose search always fails.
    failing: HashSet<String>,
    /// Queries whose next N searches fail transiently.
    flaky: Mutex<HashMap<String, u32>>,
    calls: Mutex<Vec<String>>,
}

fn candidates(hits: &[(u64, &str)]) -> Vec<CatalogCandidate> {
    hits.iter()
        .map(|(id, title)| CatalogCandidate {
            id: *id,
            title: title.to_string(),
            original_title: None,
            release_date: None,
            popularity: None,
        })
        .collect()
}

impl FakeCatalog {
    pub fn with_movie(mut self, query: &str, hits: &[(u64, &str)]) -> Self {
        for (id, title) in hits {
            self.titles.insert(*id, title.to_string());
        }
        self.movie_results.insert(query.into(), candidates(hits));
        self
    }

    pub fn with_show(mut self, query: &str, hits: &[(u64, &str)]) -> Self {
        for (id, title) in hits {
            self.titles.insert(*id, title.to_string());
        }
        self.show_results.insert(query.into(), candidates(hits));
        self
    }

    /// Movie runtime or show episode length in minutes.
    pub fn with_runtime(mut self, id: u64, minutes: u32) -> Self {
        self.runtimes.insert(id, minutes);
        self
    }

    pub fn with_delay(mut self, query: &str, millis: u64) -> Self {
        self.delays.insert(query.into(), Duration::from_millis(millis));
        self
    }

    pub fn failing(mut self, query: &str) -> Self {
        self.failing.insert(query.into());
        self
    }

    pub fn flaky(self, query: &str, failures: u32) -> Self {
        self.flaky
            .lock()
            .unwrap()
            .insert(query.into(), failures);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    async fn search(
        &self,
        kind: &str,
        query: &str,
        results: &HashMap<String, Vec<CatalogCandidate>>,
    ) -> Result<Vec<CatalogCandidate>, FakeError> {
        self.record(format!("{kind}:{query}"));
        if let Some(delay) = self.delays.get(query) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing.contains(query) {
            return Err(FakeError::Unavailable);
        }
        {
            let mut flaky = self.flaky.lock().unwrap();
            if let Some(left) = flaky.get_mut(query) {
                if *left > 0 {
                    *left -= 1;
                    return Err(FakeError::Flaky);
                }
            }
        }
        Ok(results.get(query).cloned().unwrap_or_default())
    }

    fn title_of(&self, id: u64) -> String {
        self.titles
            .get(&id)
            .cloned()
            .unwrap_or_else(|| format!("#{id}"))
    }
}

impl CatalogService for FakeCatalog {
    type Error = FakeError;

    async fn search_movies(&self, query: &str) -> Result<Vec<CatalogCandidate>, FakeError> {
        self.search("search_movies", query, &self.movie_results)
            .await
    }

    async fn movie_details(&self, id: u64) -> Result<MovieDetails, FakeError> {
        self.record(format!("movie_details:{id}"));
        Ok(MovieDetails {
            id,
            title: self.title_of(id),
            original_title: None,
            overview: None,
            release_date: None,
            runtime: self.runtimes.get(&id).copied(),
            genres: vec![],
            poster_path: None,
            vote_average: None,
            imdb_id: None,
        })
    }

    async fn search_shows(&self, query: &str) -> Result<Vec<CatalogCandidate>, FakeError> {
        self.search("search_shows", query, &self.show_results).await
    }

    async fn show_details(&self, id: u64) -> Result<ShowDetails, FakeError> {
        self.record(format!("show_details:{id}"));
        Ok(ShowDetails {
            id,
            name: self.title_of(id),
            original_name: None,
            overview: None,
            first_air_date: None,
            last_air_date: None,
            episode_run_time: self.runtimes.get(&id).copied().into_iter().collect(),
            number_of_episodes: None,
            number_of_seasons: None,
            genres: vec![],
            poster_path: None,
            vote_average: None,
            status: None,
        })
    }

    fn is_transient(error: &FakeError) -> bool {
        matches!(error, FakeError::Flaky)
    }
}
