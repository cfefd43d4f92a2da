//! Error handling
//!
//! This module defines every error type of the system: validation failures
//! raised by the record model, repository failures shared by both storage
//! backends, and their conversion into HTTP responses.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Category of a rejected field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationKind {
    /// Required text field is empty or blank
    MissingField,
    /// Value cannot be converted to the expected type
    TypeMismatch,
    /// Numeric value outside its accepted range
    OutOfRange,
    /// Value is not one of a fixed set
    InvalidEnum,
}

impl ValidationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationKind::MissingField => "missing_field",
            ValidationKind::TypeMismatch => "type_mismatch",
            ValidationKind::OutOfRange => "out_of_range",
            ValidationKind::InvalidEnum => "invalid_enum",
        }
    }
}

impl fmt::Display for ValidationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejected input, raised before any persistence attempt
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {field} ({kind}): {message}")]
pub struct ValidationError {
    pub kind: ValidationKind,
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(kind: ValidationKind, field: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind,
            field,
            message: message.into(),
        }
    }
}

/// Errors returned by every repository backend
#[derive(Error, Debug)]
pub enum RepoError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Vehicle with id '{0}' not found")]
    NotFound(String),

    #[error("Vehicle with id '{0}' already exists")]
    DuplicateId(String),

    #[error("Corrupt store at {}: {reason}", path.display())]
    CorruptStore { path: PathBuf, reason: String },

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for RepoError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::Configuration(_)
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => RepoError::StorageUnavailable(error.to_string()),
            other => RepoError::Database(other),
        }
    }
}

impl RepoError {
    pub fn corrupt(path: impl Into<PathBuf>, reason: impl fmt::Display) -> Self {
        RepoError::CorruptStore {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Stable machine-readable code, shared by the CLI and the web layer
    pub fn code(&self) -> &'static str {
        match self {
            RepoError::Validation(_) => "VALIDATION_ERROR",
            RepoError::NotFound(_) => "NOT_FOUND",
            RepoError::DuplicateId(_) => "DUPLICATE_ID",
            RepoError::CorruptStore { .. } => "CORRUPT_STORE",
            RepoError::StorageUnavailable(_) => "STORAGE_UNAVAILABLE",
            RepoError::Io(_) => "IO_ERROR",
            RepoError::Database(_) => "DB_ERROR",
        }
    }

    /// Process exit code used by the CLI
    pub fn exit_code(&self) -> i32 {
        match self {
            RepoError::Io(_) | RepoError::Database(_) => 1,
            RepoError::Validation(_) => 3,
            RepoError::NotFound(_) => 4,
            RepoError::DuplicateId(_) => 5,
            RepoError::CorruptStore { .. } => 6,
            RepoError::StorageUnavailable(_) => 7,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            RepoError::Validation(_) => StatusCode::BAD_REQUEST,
            RepoError::NotFound(_) => StatusCode::NOT_FOUND,
            RepoError::DuplicateId(_) => StatusCode::CONFLICT,
            RepoError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            RepoError::CorruptStore { .. } | RepoError::Io(_) | RepoError::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Typed result for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Errors surfaced by the front ends
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Repository(#[from] RepoError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Invalid request body: {0}")]
    InvalidBody(String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidBody(rejection.body_text())
    }
}

/// API error body
#[derive(Debug, serde::Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
    code: String,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Repository(e) => e.status_code(),
            AppError::BadRequest(_) | AppError::InvalidBody(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Process exit code; a bad request is a usage error
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Repository(e) => e.exit_code(),
            AppError::BadRequest(_) | AppError::InvalidBody(_) => 2,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match self {
            AppError::Repository(RepoError::Validation(e)) => {
                tracing::debug!(field = e.field, kind = %e.kind, "Validation error: {}", e.message);
                ErrorResponse {
                    error: "Validation Error".to_string(),
                    message: e.to_string(),
                    details: Some(json!({ "field": e.field, "kind": e.kind.as_str() })),
                    code: "VALIDATION_ERROR".to_string(),
                }
            }

            AppError::Repository(e @ RepoError::NotFound(_)) => ErrorResponse {
                error: "Not Found".to_string(),
                message: e.to_string(),
                details: None,
                code: e.code().to_string(),
            },

            AppError::Repository(e @ RepoError::DuplicateId(_)) => ErrorResponse {
                error: "Conflict".to_string(),
                message: e.to_string(),
                details: None,
                code: e.code().to_string(),
            },

            AppError::Repository(e @ RepoError::StorageUnavailable(_)) => {
                tracing::error!("Storage unavailable: {}", e);
                ErrorResponse {
                    error: "Service Unavailable".to_string(),
                    message: "The vehicle store is not reachable".to_string(),
                    details: None,
                    code: e.code().to_string(),
                }
            }

            AppError::Repository(e) => {
                tracing::error!(code = e.code(), "Storage error: {}", e);
                ErrorResponse {
                    error: "Internal Server Error".to_string(),
                    message: "An error occurred while accessing the vehicle store".to_string(),
                    details: Some(json!({ "storage_error": e.to_string() })),
                    code: e.code().to_string(),
                }
            }

            AppError::BadRequest(msg) => ErrorResponse {
                error: "Bad Request".to_string(),
                message: msg,
                details: None,
                code: "BAD_REQUEST".to_string(),
            },

            AppError::InvalidBody(msg) => {
                tracing::debug!("Rejected request body: {}", msg);
                ErrorResponse {
                    error: "Bad Request".to_string(),
                    message: msg,
                    details: None,
                    code: "INVALID_BODY".to_string(),
                }
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Typed result for web handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct_per_kind() {
        let errors = [
            RepoError::Validation(ValidationError::new(ValidationKind::OutOfRange, "mileage", "negative")),
            RepoError::NotFound("V1".into()),
            RepoError::DuplicateId("V1".into()),
            RepoError::corrupt("data/vehicles.json", "bad json"),
            RepoError::StorageUnavailable("down".into()),
        ];
        let mut codes: Vec<i32> = errors.iter().map(RepoError::exit_code).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
        assert!(codes.iter().all(|c| *c != 0));
    }

    #[test]
    fn test_pool_timeout_is_storage_unavailable() {
        let error: RepoError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(error, RepoError::StorageUnavailable(_)));

        let error: RepoError = sqlx::Error::RowNotFound.into();
        assert!(matches!(error, RepoError::Database(_)));
    }

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(RepoError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(RepoError::DuplicateId("x".into()).status_code(), StatusCode::CONFLICT);
        assert_eq!(
            RepoError::StorageUnavailable("x".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AppError::BadRequest("empty".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::InvalidBody("expected a string".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::InvalidBody("x".into()).exit_code(), 2);
    }
}
