use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::services::providers::CatalogError;
use crate::store::StoreError;

/// Application-level errors
///
/// Several call sites branch on the specific variant (AlreadyExists vs NotFound
/// vs the failure variants) to choose a distinct response, so errors stay a
/// tagged enum rather than an opaque boxed error.
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict => {
                AppError::AlreadyExists("row conflicts with an existing entry".to_string())
            }
            StoreError::Database(e) => AppError::Database(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Catalog(CatalogError::NotFound(id)) => (
                StatusCode::NOT_FOUND,
                format!("movie {} not found in catalog", id),
            ),
            AppError::AlreadyExists(msg) | AppError::InvalidInput(msg) => {
                (StatusCode::BAD_REQUEST, msg)
            }
            AppError::Database(_) | AppError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            AppError::Catalog(_) => (StatusCode::BAD_GATEWAY, self.to_string()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
