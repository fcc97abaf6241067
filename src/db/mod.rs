use sqlx::{postgres::PgPoolOptions, PgPool};

/// Connects a PostgreSQL pool and applies pending migrations
///
/// The pool is shared by every store for the lifetime of the process; five
/// connections cover the request-parallel load this service sees.
pub async fn connect(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}
