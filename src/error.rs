//!
//! # Custom Error Handling
//!
//! This module defines `AppError`, the single error type returned by services,
//! stores, extractors and middleware of both the user and the todo service.
//!
//! `AppError` implements `actix_web::error::ResponseError`, so handlers can return
//! `Result<_, AppError>` and have every failure rendered as the failure envelope
//! `{ "success": false, "message": ..., "error": ... }` with the matching status.
//! `From` implementations for `sqlx::Error`, `validator::ValidationErrors`,
//! `jsonwebtoken::errors::Error` and `bcrypt::BcryptError` keep `?` usable everywhere.

use actix_web::{
    error::{JsonPayloadError, ResponseError},
    http::StatusCode,
    HttpRequest, HttpResponse,
};
use serde_json::json;
use validator::ValidationErrors;

/// Message sent to clients in place of any internal failure detail.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Default `Conflict` text for a unique violation; stores replace it with a field-specific one.
pub const DUPLICATE_RESOURCE_MESSAGE: &str = "Resource already exists";

/// Represents all possible errors that can occur within the services.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Malformed or missing input, rejected before business logic runs (HTTP 400).
    #[error("Validation failed: {0}")]
    ValidationFailed(String),
    /// Missing, invalid or expired token, or bad login credentials (HTTP 401).
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    /// Authenticated, but not the owner of the resource (HTTP 403).
    #[error("Forbidden: {0}")]
    Forbidden(String),
    /// The referenced row does not exist (HTTP 404).
    #[error("Not Found: {0}")]
    NotFound(String),
    /// A unique field is already taken (HTTP 409).
    #[error("Conflict: {0}")]
    Conflict(String),
    /// The client exhausted its request quota for the current window (HTTP 429).
    #[error("Too Many Requests: retry after {retry_after_secs}s")]
    TooManyRequests { retry_after_secs: u64 },
    /// An unexpected server-side failure (HTTP 500).
    #[error("Internal Server Error: {0}")]
    InternalServerError(String),
    /// A failure reported by the underlying store (HTTP 500).
    #[error("Database Error: {0}")]
    DatabaseError(String),
}

impl AppError {
    /// Client-facing message. Internal details never leave the process.
    fn public_message(&self) -> String {
        match self {
            AppError::ValidationFailed(msg)
            | AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg) => msg.clone(),
            AppError::TooManyRequests { .. } => "Too many requests".to_string(),
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => {
                INTERNAL_ERROR_MESSAGE.to_string()
            }
        }
    }
}

/// Converts `AppError` variants into failure-envelope responses.
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationFailed(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::TooManyRequests { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("{}", self);
        }

        let mut builder = HttpResponse::build(status);
        if let AppError::TooManyRequests { retry_after_secs } = self {
            builder.insert_header(("Retry-After", retry_after_secs.to_string()));
        }
        builder.json(json!({
            "success": false,
            "message": self.public_message(),
            "error": status.canonical_reason().unwrap_or("Error"),
        }))
    }
}

/// Maps `sqlx` failures: unique violations become `Conflict`, `RowNotFound`
/// becomes `NotFound`, everything else is an opaque `DatabaseError`.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::Conflict(DUPLICATE_RESOURCE_MESSAGE.into())
            }
            _ => AppError::DatabaseError(error.to_string()),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationFailed(error.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        log::warn!("token rejected: {}", error);
        AppError::Unauthorized(crate::auth::token::TOKEN_REJECTED.into())
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(error.to_string())
    }
}

/// Error handler for `web::JsonConfig`: malformed bodies, unknown fields and
/// wrong content types are validation failures, not framework-default errors.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::ValidationFailed(err.to_string()).into()
}
