use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user's rating of a movie
///
/// At most one rating exists per (user, movie) pair, enforced by a uniqueness
/// constraint at the storage layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Rating {
    pub id: i64,
    pub user_id: i64,
    pub movie_id: i64,
    /// Score on a 1-5 scale
    pub score: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// Lowest score that still counts as "liked" when deriving a taste profile
pub const LIKED_SCORE_THRESHOLD: i32 = 3;

/// Valid score range for ratings
pub const SCORE_RANGE: std::ops::RangeInclusive<i32> = 1..=5;
