use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::models::movie::release_year;
use crate::models::{Movie, NewMovie};
use crate::services::providers::CatalogSource;
use crate::services::tags::TagIndex;
use crate::store::{MovieStore, StoreError};

/// Column width of the joined genre and keyword name strings; overflow is
/// truncated silently, not rejected
pub const TAG_FIELD_MAX: usize = 255;

/// Image size segment for full movie records
const POSTER_SIZE: &str = "w500";

/// Materializes external catalog entries into local storage
///
/// Exactly one local Movie row may exist per external id, including under
/// concurrent callers. The storage uniqueness constraint is the arbiter: a
/// caller that loses the insert race re-reads and returns the winner's row.
pub struct MovieIngestor {
    catalog: Arc<dyn CatalogSource>,
    movies: Arc<dyn MovieStore>,
    tags: Arc<TagIndex>,
    image_base_url: String,
}

impl MovieIngestor {
    pub fn new(
        catalog: Arc<dyn CatalogSource>,
        movies: Arc<dyn MovieStore>,
        tags: Arc<TagIndex>,
        image_base_url: String,
    ) -> Self {
        Self {
            catalog,
            movies,
            tags,
            image_base_url,
        }
    }

    /// Returns the local Movie for an external id, fetching and storing it on
    /// first reference
    pub async fn materialize(&self, external_id: i64) -> AppResult<Movie> {
        if let Some(existing) = self.movies.find_by_external_id(external_id).await? {
            return Ok(existing);
        }

        let details = self.catalog.movie_details(external_id).await?;

        // A record without a title or release date is not a real movie record
        let title = match details.title.as_deref() {
            Some(t) if !t.trim().is_empty() => t.to_string(),
            _ => {
                return Err(AppError::NotFound(format!(
                    "movie {} has no usable catalog record",
                    external_id
                )))
            }
        };
        let release_date = match details.release_date.as_deref() {
            Some(d) if !d.is_empty() => d.to_string(),
            _ => {
                return Err(AppError::NotFound(format!(
                    "movie {} has no usable catalog record",
                    external_id
                )))
            }
        };

        let keywords = self.catalog.movie_keywords(external_id).await?;

        let mut genre_names = Vec::with_capacity(details.genres.len());
        for genre in &details.genres {
            self.tags.record_genre(genre.id, &genre.name);
            genre_names.push(genre.name.clone());
        }

        let mut keyword_names = Vec::with_capacity(keywords.len());
        for keyword in &keywords {
            self.tags.record_keyword(keyword.id, &keyword.name);
            keyword_names.push(keyword.name.clone());
        }

        let poster_url = details
            .poster_path
            .map(|path| format!("{}/{}{}", self.image_base_url, POSTER_SIZE, path))
            .unwrap_or_default();

        let movie = NewMovie {
            external_id,
            title,
            poster_url,
            description: details.overview.unwrap_or_default(),
            genre: join_capped(&genre_names, TAG_FIELD_MAX),
            keyword: join_capped(&keyword_names, TAG_FIELD_MAX),
            duration: details.runtime.unwrap_or(0),
            year: release_year(&release_date).unwrap_or(0),
        };

        match self.movies.insert(movie).await {
            Ok(created) => {
                tracing::info!(external_id, title = %created.title, "Materialized movie");
                Ok(created)
            }
            // Another caller won the insert race; their row is the truth
            Err(StoreError::Conflict) => match self.movies.find_by_external_id(external_id).await? {
                Some(winner) => {
                    tracing::debug!(external_id, "Lost materialization race, re-read winner");
                    Ok(winner)
                }
                None => Err(AppError::AlreadyExists(format!(
                    "movie {} duplicates an existing record",
                    external_id
                ))),
            },
            Err(e) => Err(e.into()),
        }
    }
}

/// Joins names with ", " and truncates to `max` bytes on a char boundary
fn join_capped(names: &[String], max: usize) -> String {
    let mut joined = names.join(", ");
    if joined.len() > max {
        let mut cut = max;
        while !joined.is_char_boundary(cut) {
            cut -= 1;
        }
        joined.truncate(cut);
    }
    joined
}
