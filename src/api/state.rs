use std::sync::Arc;

use sqlx::PgPool;

use crate::services::providers::CatalogSource;
use crate::services::{
    CatalogSearchService, MovieIngestor, RatingService, RecommendationEngine, TagIndex,
    TasteProfileBuilder, WatchService,
};
use crate::store::{MovieStore, PgStore, ProfileStore, RatingStore};

/// Shared application state: stores plus the wired service graph
#[derive(Clone)]
pub struct AppState {
    pub movies: Arc<dyn MovieStore>,
    pub ratings: Arc<dyn RatingStore>,
    pub profiles: Arc<dyn ProfileStore>,
    pub ingestor: Arc<MovieIngestor>,
    pub engine: Arc<RecommendationEngine>,
    pub search: Arc<CatalogSearchService>,
    pub rating_service: Arc<RatingService>,
    pub watch_service: Arc<WatchService>,
}

impl AppState {
    /// Production wiring: PostgreSQL stores over one pool
    pub fn new(pool: PgPool, catalog: Arc<dyn CatalogSource>, image_base_url: String) -> Self {
        let store = Arc::new(PgStore::new(pool));
        let movies: Arc<dyn MovieStore> = store.clone();
        let ratings: Arc<dyn RatingStore> = store.clone();
        let profiles: Arc<dyn ProfileStore> = store;
        Self::from_parts(movies, ratings, profiles, catalog, image_base_url)
    }

    /// Wires the service graph over arbitrary store and catalog
    /// implementations; tests inject in-memory stores and a stub catalog here
    pub fn from_parts(
        movies: Arc<dyn MovieStore>,
        ratings: Arc<dyn RatingStore>,
        profiles: Arc<dyn ProfileStore>,
        catalog: Arc<dyn CatalogSource>,
        image_base_url: String,
    ) -> Self {
        let tags = Arc::new(TagIndex::seeded());

        let ingestor = Arc::new(MovieIngestor::new(
            Arc::clone(&catalog),
            Arc::clone(&movies),
            Arc::clone(&tags),
            image_base_url.clone(),
        ));
        let taste = TasteProfileBuilder::new(Arc::clone(&ratings), Arc::clone(&tags));
        let engine = Arc::new(RecommendationEngine::new(
            Arc::clone(&catalog),
            Arc::clone(&profiles),
            Arc::clone(&ratings),
            taste,
            Arc::clone(&ingestor),
        ));
        let search = Arc::new(CatalogSearchService::new(catalog, tags, image_base_url));
        let rating_service = Arc::new(RatingService::new(
            Arc::clone(&ratings),
            Arc::clone(&ingestor),
        ));
        let watch_service = Arc::new(WatchService::new(
            Arc::clone(&profiles),
            Arc::clone(&movies),
            Arc::clone(&ingestor),
        ));

        Self {
            movies,
            ratings,
            profiles,
            ingestor,
            engine,
            search,
            rating_service,
            watch_service,
        }
    }
}
