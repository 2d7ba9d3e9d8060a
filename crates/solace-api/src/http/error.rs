//! Application error type mapping to HTTP status codes and the envelope
//! format.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use solace_types::error::{IntakeError, SessionError};

use crate::http::response::ApiResponse;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Session lifecycle errors.
    Session(SessionError),
    /// Authentication failure.
    Unauthorized(String),
    /// Validation error.
    Validation(String),
    /// Generic internal error.
    Internal(String),
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        AppError::Session(e)
    }
}

impl From<IntakeError> for AppError {
    fn from(e: IntakeError) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Session(SessionError::NotFound) => (
                StatusCode::NOT_FOUND,
                "SESSION_NOT_FOUND",
                "Session not found".to_string(),
            ),
            AppError::Session(SessionError::ExchangeInProgress) => (
                StatusCode::CONFLICT,
                "EXCHANGE_IN_PROGRESS",
                "A reply to this session is already being generated".to_string(),
            ),
            AppError::Session(e @ (SessionError::NotActive | SessionError::AlreadyActive)) => {
                (StatusCode::CONFLICT, "SESSION_STATE", e.to_string())
            }
            AppError::Session(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "SESSION_ERROR",
                e.to_string(),
            ),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                msg.clone(),
            ),
        };

        (status, Json(ApiResponse::error(code, message))).into_response()
    }
}
