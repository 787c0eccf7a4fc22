use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Domain error taxonomy, mapped to HTTP at the API boundary.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing, empty, or out-of-range client input. Always client-fixable.
    #[error("{0}")]
    InvalidInput(String),

    /// A referenced movie does not exist in the catalog.
    #[error("{0}")]
    NotFound(String),

    /// The external classifier errored, timed out, or returned a malformed
    /// prediction. Not retried automatically.
    #[error("classifier unavailable: {0}")]
    ClassificationUnavailable(String),

    /// An insert hit the storage-level FK even though the service pre-checks
    /// the movie. Internal-consistency fault, not a client error.
    #[error("foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// A repository call failed.
    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            ApiError::ClassificationUnavailable(msg) => {
                tracing::error!(error = %msg, "sentiment classifier unavailable");
                (
                    StatusCode::BAD_GATEWAY,
                    json!({ "error": "Sentiment classifier unavailable" }),
                )
            }
            ApiError::ForeignKeyViolation(msg) => {
                tracing::error!(error = %msg, "insert violated catalog FK past the service pre-check");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error", "message": "storage failure" }),
                )
            }
            ApiError::Storage(err) => {
                tracing::error!(error = %err, "storage failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error", "message": "storage failure" }),
                )
            }
        };

        (status, axum::Json(body)).into_response()
    }
}
