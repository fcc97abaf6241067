use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::models::{Movie, UserProfile};
use crate::services::ingest::MovieIngestor;
use crate::store::{MovieStore, ProfileStore, StoreError};

/// Watched and watch-list operations on a user profile
///
/// Adding to either set materializes the movie on first reference. A movie
/// entering the watched set leaves the watch-list in the same step.
pub struct WatchService {
    profiles: Arc<dyn ProfileStore>,
    movies: Arc<dyn MovieStore>,
    ingestor: Arc<MovieIngestor>,
}

impl WatchService {
    pub fn new(
        profiles: Arc<dyn ProfileStore>,
        movies: Arc<dyn MovieStore>,
        ingestor: Arc<MovieIngestor>,
    ) -> Self {
        Self {
            profiles,
            movies,
            ingestor,
        }
    }

    pub async fn watched_movies(&self, profile: &UserProfile) -> AppResult<Vec<Movie>> {
        Ok(self.profiles.watched_movies(profile.id).await?)
    }

    pub async fn watch_list_movies(&self, profile: &UserProfile) -> AppResult<Vec<Movie>> {
        Ok(self.profiles.watch_list_movies(profile.id).await?)
    }

    pub async fn add_watched(&self, profile: &UserProfile, external_id: i64) -> AppResult<Movie> {
        let movie = self.ingestor.materialize(external_id).await?;

        match self.profiles.add_watched(profile.id, movie.id).await {
            Ok(()) => {
                tracing::info!(user_id = profile.user_id, external_id, "Marked watched");
                Ok(movie)
            }
            Err(StoreError::Conflict) => Err(AppError::AlreadyExists(format!(
                "movie {} is already watched",
                external_id
            ))),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn remove_watched(&self, profile: &UserProfile, external_id: i64) -> AppResult<()> {
        let movie = self.known_movie(external_id).await?;

        if self.profiles.remove_watched(profile.id, movie.id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound(format!(
                "movie {} is not in the watched set",
                external_id
            )))
        }
    }

    pub async fn add_watch_list(&self, profile: &UserProfile, external_id: i64) -> AppResult<Movie> {
        let movie = self.ingestor.materialize(external_id).await?;

        match self.profiles.add_watch_list(profile.id, movie.id).await {
            Ok(()) => {
                tracing::info!(user_id = profile.user_id, external_id, "Added to watch list");
                Ok(movie)
            }
            Err(StoreError::Conflict) => Err(AppError::AlreadyExists(format!(
                "movie {} is already on the watch list",
                external_id
            ))),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn remove_watch_list(&self, profile: &UserProfile, external_id: i64) -> AppResult<()> {
        let movie = self.known_movie(external_id).await?;

        if self.profiles.remove_watch_list(profile.id, movie.id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound(format!(
                "movie {} is not on the watch list",
                external_id
            )))
        }
    }

    /// Removal targets must already be materialized; an unknown external id
    /// cannot be in either set
    async fn known_movie(&self, external_id: i64) -> AppResult<Movie> {
        self.movies
            .find_by_external_id(external_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("movie {} is not known", external_id)))
    }
}
