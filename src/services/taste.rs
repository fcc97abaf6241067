use std::sync::Arc;

use crate::error::AppResult;
use crate::models::rating::LIKED_SCORE_THRESHOLD;
use crate::models::TasteProfile;
use crate::services::tags::TagIndex;
use crate::store::RatingStore;

/// Derives a user's taste profile from their rating history
///
/// A rating at or above `LIKED_SCORE_THRESHOLD` marks its movie's genres and
/// keywords as liked. The stored name strings are mapped back to provider ids
/// through the tag index; names the index does not know are dropped.
pub struct TasteProfileBuilder {
    ratings: Arc<dyn RatingStore>,
    tags: Arc<TagIndex>,
}

impl TasteProfileBuilder {
    pub fn new(ratings: Arc<dyn RatingStore>, tags: Arc<TagIndex>) -> Self {
        Self { ratings, tags }
    }

    pub async fn build(&self, user_id: i64) -> AppResult<TasteProfile> {
        let mut profile = TasteProfile::default();

        for (rating, movie) in self.ratings.ratings_with_movies(user_id).await? {
            if rating.score < LIKED_SCORE_THRESHOLD {
                continue;
            }

            for name in split_names(&movie.genre) {
                if let Some(id) = self.tags.genre_id_for_name(name) {
                    profile.liked_genre_ids.insert(id);
                }
            }
            for name in split_names(&movie.keyword) {
                if let Some(id) = self.tags.keyword_id_for_name(name) {
                    profile.liked_keyword_ids.insert(id);
                }
            }
        }

        tracing::debug!(
            user_id,
            genres = profile.liked_genre_ids.len(),
            keywords = profile.liked_keyword_ids.len(),
            "Built taste profile"
        );

        Ok(profile)
    }
}

fn split_names(joined: &str) -> impl Iterator<Item = &str> {
    joined
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
}
