use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Per-user profile owning the watched, watch-list, and recommended sets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserProfile {
    pub id: i64,
    pub user_id: i64,
}

/// Derived set of liked genre and keyword ids for one user
///
/// Ephemeral: rebuilt from the user's ratings on every recommendation pass,
/// never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TasteProfile {
    pub liked_genre_ids: HashSet<i64>,
    pub liked_keyword_ids: HashSet<i64>,
}

impl TasteProfile {
    /// True when the user has no liked genres and no liked keywords
    pub fn is_empty(&self) -> bool {
        self.liked_genre_ids.is_empty() && self.liked_keyword_ids.is_empty()
    }
}
