//!
//! # Custom Error Handling
//!
//! This module defines `AppError`, the single error type every handler and service
//! returns. Each variant carries the message shown to the client and maps to one
//! HTTP status:
//!
//! | Variant               | Status |
//! |-----------------------|--------|
//! | `ValidationError`     | 400    |
//! | `Unauthorized`        | 401    |
//! | `Forbidden`           | 403    |
//! | `NotFound`            | 404    |
//! | `DatabaseError`       | 500    |
//! | `InternalServerError` | 500    |
//!
//! `AppError` implements `actix_web::ResponseError`, so any `Err` that reaches actix is
//! rendered through the standard response envelope. Server-side failures are logged
//! and replaced by a generic message so internals never leak to the client.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use thiserror::Error;
use validator::ValidationErrors;

use crate::response::respond_empty;

const INTERNAL_MESSAGE: &str = "Internal server error";

/// Represents all errors that can surface from a request.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad or missing input, including duplicate unique values (HTTP 400).
    #[error("{0}")]
    ValidationError(String),
    /// Bad credentials or a missing/invalid access token (HTTP 401).
    #[error("{0}")]
    Unauthorized(String),
    /// A structurally valid credential that is no longer honoured (HTTP 403).
    #[error("{0}")]
    Forbidden(String),
    /// The scoped resource does not exist (HTTP 404).
    #[error("{0}")]
    NotFound(String),
    /// Unexpected failure from the database driver (HTTP 500).
    #[error("database error: {0}")]
    DatabaseError(String),
    /// Any other unexpected failure (HTTP 500).
    #[error("internal error: {0}")]
    InternalServerError(String),
}

impl AppError {
    /// Message rendered into the envelope. 5xx details stay in the logs.
    pub fn client_message(&self) -> String {
        match self {
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => {
                INTERNAL_MESSAGE.to_string()
            }
            other => other.to_string(),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("UNHANDLED_ERROR: {}", self);
        }
        respond_empty(status, &self.client_message())
    }
}

/// Converts `sqlx::Error` into `AppError`.
///
/// `RowNotFound` becomes a 404 and unique-constraint violations become a 400; callers
/// that know which constraint is involved map those cases themselves first.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match &error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::ValidationError("Resource already exists".into())
            }
            _ => AppError::DatabaseError(error.to_string()),
        }
    }
}

/// Converts `validator::ValidationErrors` into one aggregated 400.
impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> AppError {
        AppError::ValidationError(crate::validation::describe(&errors))
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(format!("password hashing failed: {}", error))
    }
}

impl From<actix_web::error::BlockingError> for AppError {
    fn from(error: actix_web::error::BlockingError) -> AppError {
        AppError::InternalServerError(format!("blocking task failed: {}", error))
    }
}

impl From<actix_multipart::MultipartError> for AppError {
    fn from(error: actix_multipart::MultipartError) -> AppError {
        AppError::ValidationError(format!("Invalid multipart payload: {}", error))
    }
}

/// Returns `true` when `error` is a unique-constraint violation reported by Postgres.
pub fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(error, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}
