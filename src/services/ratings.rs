use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::models::rating::SCORE_RANGE;
use crate::models::Rating;
use crate::services::ingest::MovieIngestor;
use crate::store::{RatingStore, StoreError};

/// Rating operations: one rating per (user, movie), scores on a 1-5 scale
pub struct RatingService {
    ratings: Arc<dyn RatingStore>,
    ingestor: Arc<MovieIngestor>,
}

impl RatingService {
    pub fn new(ratings: Arc<dyn RatingStore>, ingestor: Arc<MovieIngestor>) -> Self {
        Self { ratings, ingestor }
    }

    /// Rates a movie by external id, materializing it on first reference
    pub async fn add_rating(
        &self,
        user_id: i64,
        external_id: i64,
        score: i32,
        comment: &str,
    ) -> AppResult<Rating> {
        validate_score(score)?;

        // Rating a movie that cannot be ingested at all is the caller's
        // primary intent failing, so ingestion errors surface here
        let movie = self.ingestor.materialize(external_id).await?;

        match self.ratings.insert(user_id, movie.id, score, comment).await {
            Ok(rating) => {
                tracing::info!(user_id, external_id, score, "Rating added");
                Ok(rating)
            }
            Err(StoreError::Conflict) => Err(AppError::AlreadyExists(format!(
                "user {} already rated movie {}",
                user_id, external_id
            ))),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn update_rating(
        &self,
        user_id: i64,
        rating_id: i64,
        score: i32,
        comment: &str,
    ) -> AppResult<Rating> {
        validate_score(score)?;
        self.owned_rating(user_id, rating_id).await?;

        self.ratings
            .update(rating_id, score, comment)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("rating {} does not exist", rating_id)))
    }

    pub async fn delete_rating(&self, user_id: i64, rating_id: i64) -> AppResult<()> {
        self.owned_rating(user_id, rating_id).await?;

        if self.ratings.delete(rating_id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound(format!(
                "rating {} does not exist",
                rating_id
            )))
        }
    }

    /// Fails with NotFound unless the rating exists and belongs to the user
    ///
    /// A foreign rating id reports NotFound rather than a permission error so
    /// callers cannot probe other users' rating ids.
    async fn owned_rating(&self, user_id: i64, rating_id: i64) -> AppResult<Rating> {
        match self.ratings.find(rating_id).await? {
            Some(rating) if rating.user_id == user_id => Ok(rating),
            _ => Err(AppError::NotFound(format!(
                "rating {} does not exist",
                rating_id
            ))),
        }
    }
}

fn validate_score(score: i32) -> AppResult<()> {
    if SCORE_RANGE.contains(&score) {
        Ok(())
    } else {
        Err(AppError::InvalidInput(format!(
            "score must be between {} and {}",
            SCORE_RANGE.start(),
            SCORE_RANGE.end()
        )))
    }
}
