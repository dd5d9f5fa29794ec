// src/errors.rs
// DOCUMENTATION: Error types for pool initialization and the HTTP surface
// PURPOSE: Centralized error handling for the function

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

/// Why a pool initialization attempt failed
/// DOCUMENTATION: Terminal for the attempt, never retried automatically
#[derive(Error, Debug)]
pub enum InitError {
    /// One or more required variables are absent or empty
    #[error("missing environment variable for database connection: {}", missing.join(", "))]
    MissingConfig { missing: Vec<&'static str> },

    /// The connection descriptor was rejected before any network I/O
    #[error("pool open error: {0}")]
    PoolOpen(String),

    /// The pool was built but the database did not answer the probe
    #[error("DB ping error: {0}")]
    Liveness(#[source] sqlx::Error),
}

impl InitError {
    /// Short machine-readable kind, used in logs and health responses
    pub fn kind(&self) -> &'static str {
        match self {
            InitError::MissingConfig { .. } => "configuration",
            InitError::PoolOpen(_) => "pool_open",
            InitError::Liveness(_) => "liveness",
        }
    }
}

/// Errors surfaced to callers of the function over HTTP
/// DOCUMENTATION: Each variant maps to a status code and JSON error body
#[derive(Error, Debug)]
pub enum FunctionError {
    #[error("Database pool unavailable: {0}")]
    PoolUnavailable(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<Arc<InitError>> for FunctionError {
    fn from(err: Arc<InitError>) -> Self {
        FunctionError::PoolUnavailable(err.to_string())
    }
}

impl From<sqlx::Error> for FunctionError {
    fn from(err: sqlx::Error) -> Self {
        FunctionError::DatabaseError(err.to_string())
    }
}

/// Convert FunctionError to HTTP response
impl ResponseError for FunctionError {
    fn error_response(&self) -> HttpResponse {
        let error_code = match self {
            FunctionError::PoolUnavailable(_) => "POOL_UNAVAILABLE",
            FunctionError::DatabaseError(_) => "DATABASE_ERROR",
        };

        let body = json!({
            "error": {
                "code": error_code,
                "message": self.to_string(),
                "timestamp": chrono::Utc::now().to_rfc3339()
            }
        });

        HttpResponse::build(self.status_code()).json(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            FunctionError::PoolUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            FunctionError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_lists_variables() {
        let err = InitError::MissingConfig {
            missing: vec!["DB_HOST_DEV", "DB_PASSWORD_DEV"],
        };
        let message = err.to_string();

        assert!(message.contains("DB_HOST_DEV, DB_PASSWORD_DEV"));
        assert_eq!(err.kind(), "configuration");
    }

    #[test]
    fn test_pool_unavailable_is_503() {
        let err = FunctionError::from(Arc::new(InitError::PoolOpen("bad port".to_string())));

        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(err.to_string().contains("bad port"));
    }

    #[test]
    fn test_database_error_is_500() {
        let err = FunctionError::from(sqlx::Error::PoolTimedOut);

        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
