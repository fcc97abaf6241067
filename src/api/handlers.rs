use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::models::{CatalogEntry, Movie, MovieResponse, Rating, UserProfile};
use crate::services::{CatalogSections, SearchKind};

use super::AppState;

/// Header naming the acting user; token validation is the gateway's concern
pub const USER_ID_HEADER: &str = "x-user-id";

// Request types

#[derive(Debug, Deserialize)]
pub struct MovieRefRequest {
    pub external_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct AddRatingRequest {
    pub external_id: i64,
    pub score: i32,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRatingRequest {
    pub score: i32,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(rename = "type", default)]
    pub kind: SearchKind,
}

// Helpers

fn user_id(headers: &HeaderMap) -> AppResult<i64> {
    headers
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse().ok())
        .ok_or_else(|| {
            AppError::InvalidInput(format!("missing or malformed {} header", USER_ID_HEADER))
        })
}

async fn acting_profile(state: &AppState, headers: &HeaderMap) -> AppResult<UserProfile> {
    let user_id = user_id(headers)?;
    Ok(state.profiles.get_or_create(user_id).await?)
}

async fn movie_responses(state: &AppState, movies: Vec<Movie>) -> AppResult<Vec<MovieResponse>> {
    let mut responses = Vec::with_capacity(movies.len());
    for movie in movies {
        let average = state.ratings.average_for_movie(movie.id).await?;
        responses.push(MovieResponse::from_movie(movie, average));
    }
    Ok(responses)
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// Sectioned catalog landing page
pub async fn catalog(State(state): State<AppState>) -> Json<CatalogSections> {
    Json(state.search.catalog().await)
}

/// Title / genre / director search
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<Vec<CatalogEntry>>> {
    if params.q.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "Search query cannot be empty".to_string(),
        ));
    }
    Ok(Json(state.search.search(&params.q, params.kind).await))
}

/// Returns the local movie for an external id, materializing it if needed
pub async fn get_or_create_movie(
    State(state): State<AppState>,
    Json(request): Json<MovieRefRequest>,
) -> AppResult<Json<MovieResponse>> {
    let movie = state.ingestor.materialize(request.external_id).await?;
    let average = state.ratings.average_for_movie(movie.id).await?;
    Ok(Json(MovieResponse::from_movie(movie, average)))
}

pub async fn watched_movies(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<Vec<MovieResponse>>> {
    let profile = acting_profile(&state, &headers).await?;
    let movies = state.watch_service.watched_movies(&profile).await?;
    Ok(Json(movie_responses(&state, movies).await?))
}

pub async fn add_watched(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<MovieRefRequest>,
) -> AppResult<(StatusCode, Json<MovieResponse>)> {
    let profile = acting_profile(&state, &headers).await?;
    let movie = state
        .watch_service
        .add_watched(&profile, request.external_id)
        .await?;
    let average = state.ratings.average_for_movie(movie.id).await?;
    Ok((
        StatusCode::CREATED,
        Json(MovieResponse::from_movie(movie, average)),
    ))
}

pub async fn remove_watched(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<MovieRefRequest>,
) -> AppResult<StatusCode> {
    let profile = acting_profile(&state, &headers).await?;
    state
        .watch_service
        .remove_watched(&profile, request.external_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn watch_list_movies(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<Vec<MovieResponse>>> {
    let profile = acting_profile(&state, &headers).await?;
    let movies = state.watch_service.watch_list_movies(&profile).await?;
    Ok(Json(movie_responses(&state, movies).await?))
}

pub async fn add_watch_list(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<MovieRefRequest>,
) -> AppResult<(StatusCode, Json<MovieResponse>)> {
    let profile = acting_profile(&state, &headers).await?;
    let movie = state
        .watch_service
        .add_watch_list(&profile, request.external_id)
        .await?;
    let average = state.ratings.average_for_movie(movie.id).await?;
    Ok((
        StatusCode::CREATED,
        Json(MovieResponse::from_movie(movie, average)),
    ))
}

pub async fn remove_watch_list(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<MovieRefRequest>,
) -> AppResult<StatusCode> {
    let profile = acting_profile(&state, &headers).await?;
    state
        .watch_service
        .remove_watch_list(&profile, request.external_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Current recommended set, in rank order
///
/// Read-only: an empty set is returned as-is. Clients wanting lazy fill on
/// an empty read follow up with a refresh request.
pub async fn recommended_movies(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<Vec<MovieResponse>>> {
    let profile = acting_profile(&state, &headers).await?;
    let movies = state.engine.current(&profile).await?;
    Ok(Json(movie_responses(&state, movies).await?))
}

/// Recomputes the caller's recommended set
pub async fn refresh_recommendations(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<Vec<MovieResponse>>> {
    let profile = acting_profile(&state, &headers).await?;
    let movies = state.engine.refresh(&profile).await?;
    Ok(Json(movie_responses(&state, movies).await?))
}

pub async fn add_rating(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<AddRatingRequest>,
) -> AppResult<(StatusCode, Json<Rating>)> {
    let user_id = user_id(&headers)?;
    let rating = state
        .rating_service
        .add_rating(
            user_id,
            request.external_id,
            request.score,
            request.comment.as_deref().unwrap_or_default(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(rating)))
}

pub async fn update_rating(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(rating_id): Path<i64>,
    Json(request): Json<UpdateRatingRequest>,
) -> AppResult<Json<Rating>> {
    let user_id = user_id(&headers)?;
    let rating = state
        .rating_service
        .update_rating(
            user_id,
            rating_id,
            request.score,
            request.comment.as_deref().unwrap_or_default(),
        )
        .await?;
    Ok(Json(rating))
}

pub async fn delete_rating(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(rating_id): Path<i64>,
) -> AppResult<StatusCode> {
    let user_id = user_id(&headers)?;
    state.rating_service.delete_rating(user_id, rating_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
