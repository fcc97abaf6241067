/// External movie-catalog provider abstraction
///
/// The core talks to the catalog through this trait: single-item metadata
/// fetches, attribute-driven discovery, and the search endpoints. Keeping it a
/// trait lets tests substitute a stub source and keeps provider details out of
/// the services.
use async_trait::async_trait;

use crate::models::tmdb::{CrewCredit, MovieDetails, MovieSummary, PersonSummary, TagRef};

pub mod tmdb;

pub use tmdb::TmdbCatalog;

/// Failure taxonomy for catalog calls
///
/// `Transient` covers network-level failures (timeouts, refused connections)
/// that a caller may retry or skip. `Provider` is a non-2xx answer from the
/// provider: fatal for a single-item fetch, an empty result for listings.
/// `NotFound` only arises from single-item fetches.
#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    #[error("movie {0} not found in catalog")]
    NotFound(i64),

    #[error("catalog provider returned status {status}: {body}")]
    Provider { status: u16, body: String },

    #[error("catalog request failed: {0}")]
    Transient(String),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Full metadata for one movie
    async fn movie_details(&self, external_id: i64) -> CatalogResult<MovieDetails>;

    /// Keywords attached to one movie (separate provider endpoint)
    async fn movie_keywords(&self, external_id: i64) -> CatalogResult<Vec<TagRef>>;

    /// One popularity-ranked page of movies matching any of the genres
    async fn discover_by_genres(&self, genre_ids: &[i64], page: u32)
        -> CatalogResult<Vec<MovieSummary>>;

    /// One popularity-ranked page of movies matching any of the keywords
    async fn discover_by_keywords(
        &self,
        keyword_ids: &[i64],
        page: u32,
    ) -> CatalogResult<Vec<MovieSummary>>;

    async fn search_title(&self, query: &str, page: u32) -> CatalogResult<Vec<MovieSummary>>;

    async fn search_person(&self, name: &str) -> CatalogResult<Vec<PersonSummary>>;

    async fn person_movie_credits(&self, person_id: i64) -> CatalogResult<Vec<CrewCredit>>;

    async fn popular(&self, page: u32) -> CatalogResult<Vec<MovieSummary>>;

    async fn top_rated(&self, page: u32) -> CatalogResult<Vec<MovieSummary>>;
}
