use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::error::AppResult;
use crate::models::tmdb::MovieSummary;
use crate::models::{Movie, UserProfile};
use crate::services::ingest::MovieIngestor;
use crate::services::providers::CatalogSource;
use crate::services::taste::TasteProfileBuilder;
use crate::store::{ProfileStore, RatingStore};

/// Points per appearance in the combined genre discovery result
pub const GENRE_POINTS: i64 = 1;

/// Points per appearance in the combined keyword discovery result; keyword
/// overlap is a stronger taste signal than broad genre overlap
pub const KEYWORD_POINTS: i64 = 3;

/// Maximum size of a refreshed recommendation set
pub const RECOMMENDATION_CAP: usize = 20;

/// Computes and persists per-user movie recommendations
///
/// A refresh derives the taste profile, fans out discovery queries to the
/// catalog, scores and ranks the candidates, filters out movies the user
/// already knows, materializes the survivors, and atomically replaces the
/// profile's recommended set.
pub struct RecommendationEngine {
    catalog: Arc<dyn CatalogSource>,
    profiles: Arc<dyn ProfileStore>,
    ratings: Arc<dyn RatingStore>,
    taste: TasteProfileBuilder,
    ingestor: Arc<MovieIngestor>,
}

impl RecommendationEngine {
    pub fn new(
        catalog: Arc<dyn CatalogSource>,
        profiles: Arc<dyn ProfileStore>,
        ratings: Arc<dyn RatingStore>,
        taste: TasteProfileBuilder,
        ingestor: Arc<MovieIngestor>,
    ) -> Self {
        Self {
            catalog,
            profiles,
            ratings,
            taste,
            ingestor,
        }
    }

    /// The currently persisted recommended set, in rank order
    ///
    /// Read-only; an empty result does not trigger a refresh here. Callers
    /// that want lazy fill-on-empty-read invoke `refresh` themselves.
    pub async fn current(&self, profile: &UserProfile) -> AppResult<Vec<Movie>> {
        Ok(self.profiles.recommended_movies(profile.id).await?)
    }

    /// Recomputes the profile's recommended set, replacing the previous one
    ///
    /// Degrades rather than fails: a failed discovery branch contributes no
    /// candidates, and a candidate whose materialization fails is skipped.
    /// An empty taste profile clears the set without any provider calls.
    pub async fn refresh(&self, profile: &UserProfile) -> AppResult<Vec<Movie>> {
        let taste = self.taste.build(profile.user_id).await?;

        if taste.is_empty() {
            self.profiles.replace_recommended(profile.id, &[]).await?;
            tracing::info!(user_id = profile.user_id, "Empty taste profile, cleared recommendations");
            return Ok(Vec::new());
        }

        let mut genre_ids: Vec<i64> = taste.liked_genre_ids.iter().copied().collect();
        genre_ids.sort_unstable();
        let mut keyword_ids: Vec<i64> = taste.liked_keyword_ids.iter().copied().collect();
        keyword_ids.sort_unstable();

        // Both discovery branches run concurrently; a failure in one must not
        // block or fail the other
        let genre_branch = async {
            if genre_ids.is_empty() {
                return Vec::new();
            }
            match self.catalog.discover_by_genres(&genre_ids, 1).await {
                Ok(results) => results,
                Err(e) => {
                    tracing::warn!(error = %e, "Genre discovery failed, skipping branch");
                    Vec::new()
                }
            }
        };
        let keyword_branch = async {
            if keyword_ids.is_empty() {
                return Vec::new();
            }
            match self.catalog.discover_by_keywords(&keyword_ids, 1).await {
                Ok(results) => results,
                Err(e) => {
                    tracing::warn!(error = %e, "Keyword discovery failed, skipping branch");
                    Vec::new()
                }
            }
        };
        let (genre_results, keyword_results) = tokio::join!(genre_branch, keyword_branch);

        let mut scores = HashMap::new();
        accumulate(&mut scores, &genre_results, GENRE_POINTS);
        accumulate(&mut scores, &keyword_results, KEYWORD_POINTS);

        let exclusions = self.exclusion_set(profile).await?;

        let mut picked = Vec::new();
        for (external_id, score) in rank_candidates(scores) {
            if picked.len() >= RECOMMENDATION_CAP {
                break;
            }
            if exclusions.contains(&external_id) {
                continue;
            }
            match self.ingestor.materialize(external_id).await {
                Ok(movie) => picked.push(movie),
                Err(e) => {
                    tracing::warn!(
                        external_id,
                        score,
                        error = %e,
                        "Skipping candidate that failed to materialize"
                    );
                }
            }
        }

        let movie_ids: Vec<i64> = picked.iter().map(|m| m.id).collect();
        self.profiles
            .replace_recommended(profile.id, &movie_ids)
            .await?;

        tracing::info!(
            user_id = profile.user_id,
            recommended = picked.len(),
            "Refreshed recommendations"
        );

        Ok(picked)
    }

    /// Movies the user already knows: watched, watch-listed, or rated
    async fn exclusion_set(&self, profile: &UserProfile) -> AppResult<HashSet<i64>> {
        let mut exclusions: HashSet<i64> = HashSet::new();
        exclusions.extend(self.profiles.watched_external_ids(profile.id).await?);
        exclusions.extend(self.profiles.watch_list_external_ids(profile.id).await?);
        exclusions.extend(self.ratings.rated_external_ids(profile.user_id).await?);
        Ok(exclusions)
    }
}

/// Adds `points` per listing appearance, keyed by external id. A movie
/// surfacing in several result sets accumulates all of their points.
fn accumulate(scores: &mut HashMap<i64, i64>, results: &[MovieSummary], points: i64) {
    for item in results {
        *scores.entry(item.id).or_insert(0) += points;
    }
}

/// Orders candidates by accumulated score descending; equal scores order by
/// ascending external id so ranking is stable across runs
fn rank_candidates(scores: HashMap<i64, i64>) -> Vec<(i64, i64)> {
    let mut ranked: Vec<(i64, i64)> = scores.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked
}
