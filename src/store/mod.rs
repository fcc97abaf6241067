use async_trait::async_trait;

use crate::models::{Movie, NewMovie, Rating, UserProfile};

pub mod postgres;

pub use postgres::PgStore;

/// Storage-layer errors
///
/// `Conflict` is the distinguished failure for a write that lost a race
/// against a uniqueness constraint. Callers resolve it by re-reading the
/// winning row (movie materialization) or surfacing AlreadyExists (ratings,
/// watch sets); it must never be folded into the generic database error.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("row conflicts with an existing unique key")]
    Conflict,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Key-value style access to locally materialized movies, keyed by the
/// catalog provider's external id
#[async_trait]
pub trait MovieStore: Send + Sync {
    async fn find_by_external_id(&self, external_id: i64) -> StoreResult<Option<Movie>>;

    /// Inserts a new movie row
    ///
    /// Fails with `StoreError::Conflict` when another writer already inserted
    /// a row for the same external id, or for the same
    /// (title, description, genre, year) tuple.
    async fn insert(&self, movie: NewMovie) -> StoreResult<Movie>;
}

/// Access to per-user ratings
#[async_trait]
pub trait RatingStore: Send + Sync {
    async fn find(&self, rating_id: i64) -> StoreResult<Option<Rating>>;

    /// All of a user's ratings joined with the movies they rate
    async fn ratings_with_movies(&self, user_id: i64) -> StoreResult<Vec<(Rating, Movie)>>;

    /// External ids of every movie the user has rated
    async fn rated_external_ids(&self, user_id: i64) -> StoreResult<Vec<i64>>;

    /// Fails with `StoreError::Conflict` when the user already rated the movie
    async fn insert(&self, user_id: i64, movie_id: i64, score: i32, comment: &str)
        -> StoreResult<Rating>;

    /// Returns `None` when no rating with that id exists
    async fn update(&self, rating_id: i64, score: i32, comment: &str)
        -> StoreResult<Option<Rating>>;

    /// Returns whether a row was deleted
    async fn delete(&self, rating_id: i64) -> StoreResult<bool>;

    /// Mean score across all ratings of a movie, `None` when unrated
    async fn average_for_movie(&self, movie_id: i64) -> StoreResult<Option<f64>>;
}

/// Access to user profiles and their watched / watch-list / recommended sets
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get_or_create(&self, user_id: i64) -> StoreResult<UserProfile>;

    async fn watched_external_ids(&self, profile_id: i64) -> StoreResult<Vec<i64>>;

    async fn watch_list_external_ids(&self, profile_id: i64) -> StoreResult<Vec<i64>>;

    async fn watched_movies(&self, profile_id: i64) -> StoreResult<Vec<Movie>>;

    async fn watch_list_movies(&self, profile_id: i64) -> StoreResult<Vec<Movie>>;

    /// Adds a movie to the watched set, removing it from the watch-list in the
    /// same transaction (watching supersedes planning-to-watch).
    ///
    /// Fails with `StoreError::Conflict` when the movie is already watched.
    async fn add_watched(&self, profile_id: i64, movie_id: i64) -> StoreResult<()>;

    async fn remove_watched(&self, profile_id: i64, movie_id: i64) -> StoreResult<bool>;

    /// Fails with `StoreError::Conflict` when the movie is already listed
    async fn add_watch_list(&self, profile_id: i64, movie_id: i64) -> StoreResult<()>;

    async fn remove_watch_list(&self, profile_id: i64, movie_id: i64) -> StoreResult<bool>;

    /// The persisted recommended set, in rank order
    async fn recommended_movies(&self, profile_id: i64) -> StoreResult<Vec<Movie>>;

    /// Atomically replaces the recommended set with `movie_ids`, preserving
    /// their order. Concurrent readers of the same profile observe either the
    /// old set or the new one, never a partial state.
    async fn replace_recommended(&self, profile_id: i64, movie_ids: &[i64]) -> StoreResult<()>;
}
