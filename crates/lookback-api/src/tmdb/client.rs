use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use url::Url;

use super::error::TmdbError;
use super::types::{
    TmdbErrorBody, TmdbMovieDetail, TmdbMovieResult, TmdbSearchResponse, TmdbTvDetail,
    TmdbTvResult,
};
use crate::traits::{CatalogCandidate, CatalogService, MovieDetails, ShowDetails};

pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// TMDB v3 REST client authenticated with an `api_key` query parameter.
pub struct TmdbClient {
    api_key: String,
    base: Url,
    http: Client,
}

impl TmdbClient {
    pub fn new(api_key: String) -> Result<Self, TmdbError> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL, DEFAULT_TIMEOUT)
    }

    pub fn with_base_url(
        api_key: String,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, TmdbError> {
        if api_key.trim().is_empty() {
            return Err(TmdbError::MissingApiKey);
        }
        let base = Url::parse(base_url)
            .map_err(|e| TmdbError::InvalidBaseUrl(format!("{base_url}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(TmdbError::InvalidBaseUrl(base_url.to_string()));
        }
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            api_key,
            base,
            http,
        })
    }

    /// Append path segments to the base URL (`/3` + `search/movie`).
    fn endpoint(&self, segments: &[&str]) -> Result<Url, TmdbError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| TmdbError::InvalidBaseUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Query for the search endpoints. Only page 1 is ever requested.
    fn search_params<'a>(&'a self, query: &'a str) -> [(&'static str, &'a str); 4] {
        [
            ("api_key", self.api_key.as_str()),
            ("page", "1"),
            ("include_adult", "false"),
            ("query", query),
        ]
    }

    /// Check the HTTP response for errors and surface TMDB's status message.
    async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, TmdbError> {
        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        let err = Self::api_error(status, body);
        tracing::warn!("TMDB API error: {err}");
        Err(err)
    }

    /// Prefer TMDB's `status_message`; fall back to the raw body.
    fn api_error(status: u16, body: String) -> TmdbError {
        let message = serde_json::from_str::<TmdbErrorBody>(&body)
            .map(|b| b.status_message)
            .unwrap_or(body);
        TmdbError::Api { status, message }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, &str)],
    ) -> Result<T, TmdbError> {
        tracing::debug!(path = url.path(), "TMDB request");
        let resp = self.http.get(url).query(query).send().await?;
        let resp = Self::check_response(resp).await?;
        resp.json()
            .await
            .map_err(|e| TmdbError::Parse(e.to_string()))
    }
}

impl CatalogService for TmdbClient {
    type Error = TmdbError;

    async fn search_movies(&self, query: &str) -> Result<Vec<CatalogCandidate>, TmdbError> {
        let url = self.endpoint(&["search", "movie"])?;
        let search: TmdbSearchResponse<TmdbMovieResult> =
            self.get_json(url, &self.search_params(query)).await?;
        if search.total_pages > 1 {
            tracing::debug!(query, pages = search.total_pages, "Ignoring extra result pages");
        }

        Ok(search
            .results
            .into_iter()
            .map(TmdbMovieResult::into_candidate)
            .collect())
    }

    async fn movie_details(&self, id: u64) -> Result<MovieDetails, TmdbError> {
        let url = self.endpoint(&["movie", &id.to_string()])?;
        let detail: TmdbMovieDetail = self
            .get_json(url, &[("api_key", self.api_key.as_str())])
            .await?;
        Ok(detail.into_details())
    }

    async fn search_shows(&self, query: &str) -> Result<Vec<CatalogCandidate>, TmdbError> {
        let url = self.endpoint(&["search", "tv"])?;
        let search: TmdbSearchResponse<TmdbTvResult> =
            self.get_json(url, &self.search_params(query)).await?;
        if search.total_pages > 1 {
            tracing::debug!(query, pages = search.total_pages, "Ignoring extra result pages");
        }

        Ok(search
            .results
            .into_iter()
            .map(TmdbTvResult::into_candidate)
            .collect())
    }

    async fn show_details(&self, id: u64) -> Result<ShowDetails, TmdbError> {
        let url = self.endpoint(&["tv", &id.to_string()])?;
        let detail: TmdbTvDetail = self
            .get_json(url, &[("api_key", self.api_key.as_str())])
            .await?;
        Ok(detail.into_details())
    }

    fn is_transient(error: &TmdbError) -> bool {
        error.is_transient()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> TmdbClient {
        TmdbClient::with_base_url("key123".into(), base, DEFAULT_TIMEOUT).unwrap()
    }

    #[test]
    fn test_missing_api_key() {
        assert!(matches!(
            TmdbClient::new("  ".into()),
            Err(TmdbError::MissingApiKey)
        ));
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            TmdbClient::with_base_url("k".into(), "not a url", DEFAULT_TIMEOUT),
            Err(TmdbError::InvalidBaseUrl(_))
        ));
        assert!(matches!(
            TmdbClient::with_base_url("k".into(), "mailto:someone@example.com", DEFAULT_TIMEOUT),
            Err(TmdbError::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn test_api_error_uses_status_message() {
        let body = r#"{"status_code":34,"status_message":"The resource you requested could not be found.","success":false}"#;
        match TmdbClient::api_error(404, body.into()) {
            TmdbError::Api { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "The resource you requested could not be found.");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let err = TmdbClient::api_error(502, "Bad Gateway".into());
        assert!(err.is_transient());
        assert!(matches!(err, TmdbError::Api { ref message, .. } if message == "Bad Gateway"));
    }

    #[test]
    fn test_endpoint_keeps_version_prefix() {
        let c = client(DEFAULT_BASE_URL);
        assert_eq!(
            c.endpoint(&["search", "movie"]).unwrap().as_str(),
            "https://api.themoviedb.org/3/search/movie"
        );
        assert_eq!(
            c.endpoint(&["tv", "70523"]).unwrap().as_str(),
            "https://api.themoviedb.org/3/tv/70523"
        );
    }

    #[test]
    fn test_endpoint_with_trailing_slash() {
        let c = client("http://localhost:8080/3/");
        assert_eq!(
            c.endpoint(&["movie", "1"]).unwrap().as_str(),
            "http://localhost:8080/3/movie/1"
        );
    }

    #[test]
    fn test_search_params() {
        let c = client(DEFAULT_BASE_URL);
        assert_eq!(
            c.search_params("Dark"),
            [
                ("api_key", "key123"),
                ("page", "1"),
                ("include_adult", "false"),
                ("query", "Dark"),
            ]
        );
    }
}
