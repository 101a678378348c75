//! Error types for the QOTD API

use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, QotdError>;

#[derive(Error, Debug)]
pub enum QotdError {
    /// A required field was empty. `field` is the capitalized field name.
    #[error("Field '{field}' missing")]
    Validation { field: &'static str },

    #[error("{resource} not found: {id}")]
    NotFound { resource: &'static str, id: i64 },

    #[error("Query timed out after {0:?}")]
    Timeout(Duration),

    #[error("Unsupported database type: {0}")]
    BackendUnsupported(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Config error: {0}")]
    Config(String),
}

impl QotdError {
    pub fn not_found(resource: &'static str, id: i64) -> Self {
        QotdError::NotFound { resource, id }
    }

    /// Whether the failure was caused by the caller rather than the backend
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            QotdError::Validation { .. } | QotdError::NotFound { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = QotdError::Validation { field: "Author" };
        assert_eq!(err.to_string(), "Field 'Author' missing");

        let err = QotdError::not_found("quote", 7);
        assert_eq!(err.to_string(), "quote not found: 7");
        assert!(err.is_client_error());

        let err = QotdError::Timeout(Duration::from_millis(250));
        assert!(!err.is_client_error());
    }
}
