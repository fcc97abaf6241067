use async_trait::async_trait;
use sqlx::PgPool;

use crate::models::{Movie, NewMovie, Rating, UserProfile};

use super::{MovieStore, ProfileStore, RatingStore, StoreError, StoreResult};

/// PostgreSQL-backed storage
///
/// One struct implements all three store traits; services hold whichever
/// trait object they need.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Distinguishes a lost uniqueness race from every other database failure
fn map_write_err(e: sqlx::Error) -> StoreError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Conflict,
        _ => StoreError::Database(e),
    }
}

#[async_trait]
impl MovieStore for PgStore {
    async fn find_by_external_id(&self, external_id: i64) -> StoreResult<Option<Movie>> {
        let movie = sqlx::query_as::<_, Movie>("SELECT * FROM movies WHERE external_id = $1")
            .bind(external_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(movie)
    }

    async fn insert(&self, movie: NewMovie) -> StoreResult<Movie> {
        let inserted = sqlx::query_as::<_, Movie>(
            r#"
            INSERT INTO movies (external_id, title, poster_url, description, genre, keyword, duration, year)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(movie.external_id)
        .bind(&movie.title)
        .bind(&movie.poster_url)
        .bind(&movie.description)
        .bind(&movie.genre)
        .bind(&movie.keyword)
        .bind(movie.duration)
        .bind(movie.year)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_err)?;

        Ok(inserted)
    }
}

#[async_trait]
impl RatingStore for PgStore {
    async fn find(&self, rating_id: i64) -> StoreResult<Option<Rating>> {
        let rating = sqlx::query_as::<_, Rating>("SELECT * FROM ratings WHERE id = $1")
            .bind(rating_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(rating)
    }

    async fn ratings_with_movies(&self, user_id: i64) -> StoreResult<Vec<(Rating, Movie)>> {
        let ratings = sqlx::query_as::<_, Rating>(
            "SELECT * FROM ratings WHERE user_id = $1 ORDER BY created_at",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let movie_ids: Vec<i64> = ratings.iter().map(|r| r.movie_id).collect();
        let movies = sqlx::query_as::<_, Movie>("SELECT * FROM movies WHERE id = ANY($1)")
            .bind(&movie_ids)
            .fetch_all(&self.pool)
            .await?;

        let pairs = ratings
            .into_iter()
            .filter_map(|rating| {
                let movie = movies.iter().find(|m| m.id == rating.movie_id)?.clone();
                Some((rating, movie))
            })
            .collect();
        Ok(pairs)
    }

    async fn rated_external_ids(&self, user_id: i64) -> StoreResult<Vec<i64>> {
        let ids = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT m.external_id FROM ratings r
            JOIN movies m ON m.id = r.movie_id
            WHERE r.user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    async fn insert(
        &self,
        user_id: i64,
        movie_id: i64,
        score: i32,
        comment: &str,
    ) -> StoreResult<Rating> {
        let rating = sqlx::query_as::<_, Rating>(
            r#"
            INSERT INTO ratings (user_id, movie_id, score, comment)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(movie_id)
        .bind(score)
        .bind(comment)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_err)?;

        Ok(rating)
    }

    async fn update(
        &self,
        rating_id: i64,
        score: i32,
        comment: &str,
    ) -> StoreResult<Option<Rating>> {
        let rating = sqlx::query_as::<_, Rating>(
            "UPDATE ratings SET score = $2, comment = $3 WHERE id = $1 RETURNING *",
        )
        .bind(rating_id)
        .bind(score)
        .bind(comment)
        .fetch_optional(&self.pool)
        .await?;
        Ok(rating)
    }

    async fn delete(&self, rating_id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM ratings WHERE id = $1")
            .bind(rating_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn average_for_movie(&self, movie_id: i64) -> StoreResult<Option<f64>> {
        let avg = sqlx::query_scalar::<_, Option<f64>>(
            "SELECT AVG(score)::FLOAT8 FROM ratings WHERE movie_id = $1",
        )
        .bind(movie_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(avg)
    }
}

#[async_trait]
impl ProfileStore for PgStore {
    async fn get_or_create(&self, user_id: i64) -> StoreResult<UserProfile> {
        sqlx::query("INSERT INTO user_profiles (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        let profile =
            sqlx::query_as::<_, UserProfile>("SELECT * FROM user_profiles WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(profile)
    }

    async fn watched_external_ids(&self, profile_id: i64) -> StoreResult<Vec<i64>> {
        let ids = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT m.external_id FROM profile_watched w
            JOIN movies m ON m.id = w.movie_id
            WHERE w.profile_id = $1
            "#,
        )
        .bind(profile_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    async fn watch_list_external_ids(&self, profile_id: i64) -> StoreResult<Vec<i64>> {
        let ids = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT m.external_id FROM profile_watch_list l
            JOIN movies m ON m.id = l.movie_id
            WHERE l.profile_id = $1
            "#,
        )
        .bind(profile_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    async fn watched_movies(&self, profile_id: i64) -> StoreResult<Vec<Movie>> {
        let movies = sqlx::query_as::<_, Movie>(
            r#"
            SELECT m.* FROM profile_watched w
            JOIN movies m ON m.id = w.movie_id
            WHERE w.profile_id = $1
            ORDER BY m.title
            "#,
        )
        .bind(profile_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(movies)
    }

    async fn watch_list_movies(&self, profile_id: i64) -> StoreResult<Vec<Movie>> {
        let movies = sqlx::query_as::<_, Movie>(
            r#"
            SELECT m.* FROM profile_watch_list l
            JOIN movies m ON m.id = l.movie_id
            WHERE l.profile_id = $1
            ORDER BY m.title
            "#,
        )
        .bind(profile_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(movies)
    }

    async fn add_watched(&self, profile_id: i64, movie_id: i64) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO profile_watched (profile_id, movie_id) VALUES ($1, $2)")
            .bind(profile_id)
            .bind(movie_id)
            .execute(&mut *tx)
            .await
            .map_err(map_write_err)?;

        // Watching supersedes planning-to-watch
        sqlx::query("DELETE FROM profile_watch_list WHERE profile_id = $1 AND movie_id = $2")
            .bind(profile_id)
            .bind(movie_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn remove_watched(&self, profile_id: i64, movie_id: i64) -> StoreResult<bool> {
        let result =
            sqlx::query("DELETE FROM profile_watched WHERE profile_id = $1 AND movie_id = $2")
                .bind(profile_id)
                .bind(movie_id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn add_watch_list(&self, profile_id: i64, movie_id: i64) -> StoreResult<()> {
        sqlx::query("INSERT INTO profile_watch_list (profile_id, movie_id) VALUES ($1, $2)")
            .bind(profile_id)
            .bind(movie_id)
            .execute(&self.pool)
            .await
            .map_err(map_write_err)?;
        Ok(())
    }

    async fn remove_watch_list(&self, profile_id: i64, movie_id: i64) -> StoreResult<bool> {
        let result =
            sqlx::query("DELETE FROM profile_watch_list WHERE profile_id = $1 AND movie_id = $2")
                .bind(profile_id)
                .bind(movie_id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn recommended_movies(&self, profile_id: i64) -> StoreResult<Vec<Movie>> {
        let movies = sqlx::query_as::<_, Movie>(
            r#"
            SELECT m.* FROM profile_recommended r
            JOIN movies m ON m.id = r.movie_id
            WHERE r.profile_id = $1
            ORDER BY r.position
            "#,
        )
        .bind(profile_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(movies)
    }

    async fn replace_recommended(&self, profile_id: i64, movie_ids: &[i64]) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM profile_recommended WHERE profile_id = $1")
            .bind(profile_id)
            .execute(&mut *tx)
            .await?;

        for (position, movie_id) in movie_ids.iter().enumerate() {
            sqlx::query(
                "INSERT INTO profile_recommended (profile_id, movie_id, position) VALUES ($1, $2, $3)",
            )
            .bind(profile_id)
            .bind(movie_id)
            .bind(position as i32)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
