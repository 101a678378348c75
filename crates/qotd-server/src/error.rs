//! Error handling for the REST API

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use qotd_core::QotdError;
use serde_json::json;

/// API error type. Serialized as `{"error": message}`.
#[derive(Debug, thiserror::Error)]
#[error("[{status}] {message}")]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, "{}", self.message);
        }
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<QotdError> for ApiError {
    fn from(err: QotdError) -> Self {
        match err {
            QotdError::Validation { .. } => ApiError::bad_request(err.to_string()),
            QotdError::NotFound { .. } => ApiError::not_found(err.to_string()),
            QotdError::Timeout(_) => ApiError::new(StatusCode::GATEWAY_TIMEOUT, err.to_string()),
            QotdError::BackendUnsupported(_) | QotdError::Config(_) | QotdError::Storage(_) => {
                ApiError::internal(err.to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

/// Result type alias for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;
