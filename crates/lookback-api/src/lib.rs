//! Media catalog clients.
//!
//! [`traits::CatalogService`] is the seam the resolver depends on;
//! [`tmdb::TmdbClient`] implements it against The Movie Database v3 API.

pub mod tmdb;
pub mod traits;

pub use traits::{CatalogCandidate, CatalogService, MovieDetails, ShowDetails};
