//! Error mapping and database plumbing shared by the HTTP handlers.

use crate::AppState;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use carlot_cars::{CarError, ValidationError};
use carlot_db::SessionError;
use rusqlite::Transaction;
use thiserror::Error;

/// API error type mapping to HTTP status codes.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid input: {0}")]
    BadRequest(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Unprocessable(#[from] ValidationError),
    #[error("malformed body: {0}")]
    Rejected(#[from] JsonRejection),
    #[error("internal server error: {0}")]
    InternalServerError(String),
}

impl From<CarError> for ApiError {
    fn from(e: CarError) -> Self {
        match e {
            CarError::NotFound(_) => ApiError::NotFound(e.to_string()),
            // Duplicate keys are reported as 400, not 409.
            CarError::AlreadyExists(_) => ApiError::BadRequest(e.to_string()),
            CarError::Validation(v) => ApiError::Unprocessable(v),
            CarError::EmptyCollection | CarError::Database(_) => {
                ApiError::InternalServerError(e.to_string())
            }
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(e: SessionError) -> Self {
        ApiError::InternalServerError(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest(msg) => {
                tracing::warn!(error = %msg, "rejected request");
                (StatusCode::BAD_REQUEST, serde_json::json!({ "error": msg }))
            }
            ApiError::NotFound(msg) => {
                tracing::warn!(error = %msg, "resource not found");
                (StatusCode::NOT_FOUND, serde_json::json!({ "error": msg }))
            }
            ApiError::Unprocessable(v) => {
                tracing::warn!(error = %v, "validation failed");
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    serde_json::json!({
                        "error": v.to_string(),
                        "fields": v.violations,
                    }),
                )
            }
            ApiError::Rejected(rejection) => {
                tracing::warn!(error = %rejection, "malformed request body");
                (
                    rejection.status(),
                    serde_json::json!({ "error": rejection.body_text() }),
                )
            }
            ApiError::InternalServerError(msg) => {
                tracing::error!(error = %msg, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    serde_json::json!({ "error": msg }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Runs `work` in a unit of work on a blocking thread.
///
/// The connection is checked out, used and returned entirely within the
/// blocking task, so it never crosses an `.await`.
pub(crate) async fn with_unit_of_work<T, F>(state: &AppState, work: F) -> Result<T, ApiError>
where
    F: FnOnce(&Transaction<'_>) -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    let pool = state.pool.clone();
    tokio::task::spawn_blocking(move || carlot_db::unit_of_work(&pool, work))
        .await
        .map_err(|e| ApiError::InternalServerError(format!("task join error: {}", e)))?
}
