use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use serde_json::json;
use crate::errors::AppError;

// The IntoResponse trait implementation converts AppError into a well-formed HTTP response.
// Every error body carries a stable machine-readable code next to the message;
// upstream store/file detail is logged but never forwarded to the client.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "validation", msg),

            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),

            AppError::Unauthorized(msg) => (StatusCode::FORBIDDEN, "unauthorized", msg),

            AppError::Cooldown(msg) => (StatusCode::FORBIDDEN, "cooldown", msg),

            // Duplicate email keeps the 400 the original callers expect
            AppError::Conflict(msg) => (StatusCode::BAD_REQUEST, "conflict", msg),

            AppError::Upload(msg) => (StatusCode::BAD_REQUEST, "upload", msg),

            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal",
                    "Internal server error".to_string(),
                )
            }

            AppError::Redis(e) => {
                tracing::error!("Store error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "storage",
                    "Storage backend error".to_string(),
                )
            }

            AppError::File(e) => {
                tracing::error!("File error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "storage",
                    "File storage error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message, "code": code }))).into_response()
    }
}
