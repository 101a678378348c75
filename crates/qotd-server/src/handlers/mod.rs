//! HTTP handlers

pub mod health;
pub mod records;

pub use health::health;

use crate::error::ApiError;
use axum::http::{Method, StatusCode};

/// Fallback for paths no route matches
pub async fn not_found() -> ApiError {
    ApiError::not_found("the requested resource could not be found")
}

/// Fallback for known paths hit with an unsupported method
pub async fn method_not_allowed(method: Method) -> ApiError {
    ApiError::new(
        StatusCode::METHOD_NOT_ALLOWED,
        format!("The {} method is not supported for this resource", method),
    )
}
