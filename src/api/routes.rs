use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::request_id::{make_span_with_request_id, request_id_middleware};

use super::handlers;
use super::AppState;

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        // Catalog & movies
        .route(
            "/movies",
            get(handlers::catalog).post(handlers::get_or_create_movie),
        )
        .route("/movies/search", get(handlers::search))
        // Watched set
        .route(
            "/movies/watched",
            get(handlers::watched_movies)
                .post(handlers::add_watched)
                .delete(handlers::remove_watched),
        )
        // Watch list
        .route(
            "/movies/watch_list",
            get(handlers::watch_list_movies)
                .post(handlers::add_watch_list)
                .delete(handlers::remove_watch_list),
        )
        // Recommendations
        .route(
            "/recommended_movies",
            get(handlers::recommended_movies).post(handlers::refresh_recommendations),
        )
        // Ratings
        .route("/ratings", post(handlers::add_rating))
        .route(
            "/ratings/:id",
            put(handlers::update_rating).delete(handlers::delete_rating),
        );

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api", api)
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
