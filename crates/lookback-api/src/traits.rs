//! Trait definitions for media catalog services.
//!
//! The resolver only talks to a [`CatalogService`], so the TMDB client can
//! be swapped for another catalog or an in-memory fake in tests.

use std::future::Future;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A media catalog offering title search and lookup by id.
pub trait CatalogService: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Search movies by title. Only the first result page is returned.
    fn search_movies(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Vec<CatalogCandidate>, Self::Error>> + Send;

    /// Full movie record by catalog id.
    fn movie_details(&self, id: u64)
        -> impl Future<Output = Result<MovieDetails, Self::Error>> + Send;

    /// Search TV shows by title. Only the first result page is returned.
    fn search_shows(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Vec<CatalogCandidate>, Self::Error>> + Send;

    /// Full show record by catalog id.
    fn show_details(&self, id: u64)
        -> impl Future<Output = Result<ShowDetails, Self::Error>> + Send;

    /// Whether a failed call is worth repeating.
    fn is_transient(_error: &Self::Error) -> bool {
        false
    }
}

/// One search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogCandidate {
    pub id: u64,
    /// Display title (`title` for movies, `name` for shows).
    pub title: String,
    pub original_title: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub popularity: Option<f64>,
}

/// Catalog record for a movie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieDetails {
    pub id: u64,
    pub title: String,
    pub original_title: Option<String>,
    pub overview: Option<String>,
    pub release_date: Option<NaiveDate>,
    /// Length in minutes.
    pub runtime: Option<u32>,
    pub genres: Vec<String>,
    pub poster_path: Option<String>,
    pub vote_average: Option<f32>,
    pub imdb_id: Option<String>,
}

/// Catalog record for a TV show.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowDetails {
    pub id: u64,
    pub name: String,
    pub original_name: Option<String>,
    pub overview: Option<String>,
    pub first_air_date: Option<NaiveDate>,
    pub last_air_date: Option<NaiveDate>,
    /// Typical episode lengths in minutes, as the catalog lists them.
    pub episode_run_time: Vec<u32>,
    pub number_of_episodes: Option<u32>,
    pub number_of_seasons: Option<u32>,
    pub genres: Vec<String>,
    pub poster_path: Option<String>,
    pub vote_average: Option<f32>,
    pub status: Option<String>,
}

impl ShowDetails {
    /// Representative episode length: the first listed run time.
    pub fn episode_minutes(&self) -> Option<u32> {
        self.episode_run_time.first().copied()
    }
}
