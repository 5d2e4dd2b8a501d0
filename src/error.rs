//! Application error types
//!
//! One error enum covers the whole service; every variant maps to a fixed
//! HTTP status so handlers can return `Result<Json<T>>` and let axum do the
//! rest.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

/// Errors surfaced by the betting core and its HTTP layer
#[derive(Debug)]
pub enum AppError {
    /// Malformed input: unknown pick/outcome value, bad payload
    Validation(String),
    /// Missing or unverifiable bearer token
    Unauthorized,
    /// Caller identity is known but not allowed to do this
    Authorization(String),
    /// Lock window active, or match/round already finalized or resolved
    StateConflict(String),
    /// Missing match/round/tournament/pool
    NotFound(String),
    /// Foreign-key conflict inside a cascade transaction
    Integrity(String),
    /// Anything the store reports that we did not anticipate
    Database(sqlx::Error),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(msg) => write!(f, "Invalid input: {}", msg),
            AppError::Unauthorized => write!(f, "Missing or invalid credentials"),
            AppError::Authorization(msg) => write!(f, "Not allowed: {}", msg),
            AppError::StateConflict(msg) => write!(f, "{}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Integrity(msg) => write!(f, "Integrity violation: {}", msg),
            AppError::Database(e) => write!(f, "Database error: {}", e),
        }
    }
}

impl std::error::Error for AppError {}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Database(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Authorization(_) => StatusCode::FORBIDDEN,
            AppError::StateConflict(_) => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Integrity(_) | AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("request failed: {}", self);
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Result type for all service operations
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AppError::StateConflict("apostas fechadas".to_string());
        assert_eq!(err.to_string(), "apostas fechadas");

        let err = AppError::NotFound("match 42".to_string());
        assert_eq!(err.to_string(), "Not found: match 42");
    }
}
