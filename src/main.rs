use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use filmhub_api::api::{create_router, AppState};
use filmhub_api::config::Config;
use filmhub_api::db;
use filmhub_api::services::providers::TmdbCatalog;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let pool = db::connect(&config.database_url).await?;

    let catalog = TmdbCatalog::new(config.tmdb_api_key.clone(), config.tmdb_api_url.clone())?;
    let state = AppState::new(pool, Arc::new(catalog), config.tmdb_image_url.clone());

    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
