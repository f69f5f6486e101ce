use chrono::NaiveDate;
use serde::Deserialize;

use crate::traits::{CatalogCandidate, MovieDetails, ShowDetails};

// ── Search responses ────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct TmdbSearchResponse<T> {
    #[serde(default)]
    pub page: u32,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u32,
}

#[derive(Debug, Deserialize)]
pub struct TmdbMovieResult {
    pub id: u64,
    pub title: String,
    pub original_title: Option<String>,
    pub release_date: Option<String>,
    pub popularity: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct TmdbTvResult {
    pub id: u64,
    pub name: String,
    pub original_name: Option<String>,
    pub first_air_date: Option<String>,
    pub popularity: Option<f64>,
}

// ── Detail responses ────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct TmdbGenre {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct TmdbMovieDetail {
    pub id: u64,
    pub title: String,
    pub original_title: Option<String>,
    pub overview: Option<String>,
    pub release_date: Option<String>,
    pub runtime: Option<u32>,
    #[serde(default)]
    pub genres: Vec<TmdbGenre>,
    pub poster_path: Option<String>,
    pub vote_average: Option<f32>,
    pub imdb_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TmdbTvDetail {
    pub id: u64,
    pub name: String,
    pub original_name: Option<String>,
    pub overview: Option<String>,
    pub first_air_date: Option<String>,
    pub last_air_date: Option<String>,
    #[serde(default)]
    pub episode_run_time: Vec<u32>,
    pub number_of_episodes: Option<u32>,
    pub number_of_seasons: Option<u32>,
    #[serde(default)]
    pub genres: Vec<TmdbGenre>,
    pub poster_path: Option<String>,
    pub vote_average: Option<f32>,
    pub status: Option<String>,
}

/// Body TMDB sends with non-2xx responses.
#[derive(Debug, Deserialize)]
pub struct TmdbErrorBody {
    pub status_code: Option<i32>,
    pub status_message: String,
}

// ── Conversions to shared trait types ───────────────────────────

/// TMDB sends `""` for unknown dates.
fn parse_date(raw: Option<String>) -> Option<NaiveDate> {
    raw.filter(|s| !s.is_empty())
        .and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok())
}

fn genre_names(genres: Vec<TmdbGenre>) -> Vec<String> {
    genres.into_iter().map(|g| g.name).collect()
}

impl TmdbMovieResult {
    pub fn into_candidate(self) -> CatalogCandidate {
        CatalogCandidate {
            id: self.id,
            title: self.title,
            original_title: self.original_title,
            release_date: parse_date(self.release_date),
            popularity: self.popularity,
        }
    }
}

impl TmdbTvResult {
    pub fn into_candidate(self) -> CatalogCandidate {
        CatalogCandidate {
            id: self.id,
            title: self.name,
            original_title: self.original_name,
            release_date: parse_date(self.first_air_date),
            popularity: self.popularity,
        }
    }
}

impl TmdbMovieDetail {
    pub fn into_details(self) -> MovieDetails {
        MovieDetails {
            id: self.id,
            title: self.title,
            original_title: self.original_title,
            overview: self.overview,
            release_date: parse_date(self.release_date),
            runtime: self.runtime,
            genres: genre_names(self.genres),
            poster_path: self.poster_path,
            vote_average: self.vote_average,
            imdb_id: self.imdb_id,
        }
    }
}

impl TmdbTvDetail {
    pub fn into_details(self) -> ShowDetails {
        ShowDetails {
            id: self.id,
            name: self.name,
            original_name: self.original_name,
            overview: self.overview,
            first_air_date: parse_date(self.first_air_date),
            last_air_date: parse_date(self.last_air_date),
            episode_run_time: self.episode_run_time,
            number_of_episodes: self.number_of_episodes,
            number_of_seasons: self.number_of_seasons,
            genres: genre_names(self.genres),
            poster_path: self.poster_path,
            vote_average: self.vote_average,
            status: self.status,
        }
    }
}
