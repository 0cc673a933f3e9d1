// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// Failure modes of recording and reading quiz results.
///
/// Every variant is raised before or instead of a write; a failed call never
/// leaves a partial record behind.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordError {
    /// A field is missing, empty, or outside its allowed range.
    Validation(String),

    /// The `userId` reference is absent or malformed.
    Reference(String),

    /// The requested record does not exist.
    NotFound(String),

    /// The underlying store failed.
    Persistence(String),
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordError::Validation(msg) => write!(f, "validation error: {}", msg),
            RecordError::Reference(msg) => write!(f, "reference error: {}", msg),
            RecordError::NotFound(msg) => write!(f, "not found: {}", msg),
            RecordError::Persistence(msg) => write!(f, "persistence error: {}", msg),
        }
    }
}

impl std::error::Error for RecordError {}

impl From<sqlx::Error> for RecordError {
    fn from(err: sqlx::Error) -> Self {
        RecordError::Persistence(err.to_string())
    }
}

impl From<validator::ValidationErrors> for RecordError {
    fn from(errs: validator::ValidationErrors) -> Self {
        RecordError::Validation(errs.to_string())
    }
}

/// Global Application Error Enum.
/// Centralizes error handling and mapping to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    // 500 Internal Server Error
    InternalServerError(String),

    // 400 Bad Request
    BadRequest(String),

    // 401 Unauthorized
    AuthError(String),

    // 403 Forbidden (authenticated, but not allowed to touch this record)
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 422 Unprocessable Entity (well-formed body, bad user reference)
    UnprocessableEntity(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for AppError {}

/// Converts the error into a JSON response with appropriate HTTP status code.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::AuthError(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::UnprocessableEntity(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
        };
        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<RecordError> for AppError {
    fn from(err: RecordError) -> Self {
        match err {
            RecordError::Validation(msg) => AppError::BadRequest(msg),
            RecordError::Reference(msg) => AppError::UnprocessableEntity(msg),
            RecordError::NotFound(msg) => AppError::NotFound(msg),
            RecordError::Persistence(msg) => AppError::InternalServerError(msg),
        }
    }
}
