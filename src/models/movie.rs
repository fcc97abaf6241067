use serde::{Deserialize, Serialize};

/// A locally materialized movie record
///
/// Exactly one row exists per catalog `external_id`; the row is written once
/// on first reference and never mutated afterwards by this service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Movie {
    pub id: i64,
    /// Identifier assigned by the external catalog provider
    pub external_id: i64,
    pub title: String,
    pub poster_url: String,
    pub description: String,
    /// Genre names joined with ", ", truncated to the column width
    pub genre: String,
    /// Keyword names joined with ", ", truncated to the column width
    pub keyword: String,
    /// Runtime in minutes
    pub duration: i32,
    pub year: i32,
}

/// Field values for a movie that has not been persisted yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewMovie {
    pub external_id: i64,
    pub title: String,
    pub poster_url: String,
    pub description: String,
    pub genre: String,
    pub keyword: String,
    pub duration: i32,
    pub year: i32,
}

/// Movie payload returned to clients, with the aggregate rating attached
#[derive(Debug, Clone, Serialize)]
pub struct MovieResponse {
    pub external_id: i64,
    pub title: String,
    pub poster_url: String,
    pub description: String,
    pub genre: String,
    pub keyword: String,
    pub duration: i32,
    pub year: i32,
    pub average_rating: Option<f64>,
}

impl MovieResponse {
    pub fn from_movie(movie: Movie, average_rating: Option<f64>) -> Self {
        Self {
            external_id: movie.external_id,
            title: movie.title,
            poster_url: movie.poster_url,
            description: movie.description,
            genre: movie.genre,
            keyword: movie.keyword,
            duration: movie.duration,
            year: movie.year,
            average_rating: average_rating.map(|avg| (avg * 100.0).round() / 100.0),
        }
    }
}

/// A catalog listing entry shaped for clients
///
/// Listing endpoints return provider summaries, not materialized movies, so
/// this carries only the fields a browse page needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub external_id: i64,
    pub title: String,
    pub poster_url: String,
    pub genre: String,
    pub year: Option<i32>,
    pub average_rating: f64,
}

/// Extracts the year from an ISO date string ("2023-10-20" -> 2023)
pub fn release_year(date: &str) -> Option<i32> {
    date.split('-').next()?.parse().ok()
}
