//! API error types and handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use dtrack_domain::errors::DomainError;
use dtrack_storage::StorageError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            ApiError::Authentication(_) => (StatusCode::UNAUTHORIZED, "authentication_error"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ApiError::Domain(domain) => match domain {
                DomainError::Validation { .. } => (StatusCode::BAD_REQUEST, "validation_error"),
                DomainError::InvalidCredentials => {
                    (StatusCode::UNAUTHORIZED, "authentication_error")
                }
                DomainError::TokenExpired => (StatusCode::UNAUTHORIZED, "token_expired"),
                DomainError::Authorization { .. } => {
                    (StatusCode::FORBIDDEN, "authorization_error")
                }
                DomainError::EntityNotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
                DomainError::TransitionDenied { .. } => {
                    (StatusCode::CONFLICT, "transition_conflict")
                }
                DomainError::ConcurrencyConflict { .. } => {
                    (StatusCode::CONFLICT, "concurrency_conflict")
                }
                DomainError::EmailAlreadyExists { .. } => {
                    (StatusCode::CONFLICT, "email_already_exists")
                }
                DomainError::Repository { .. } => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "repository_error")
                }
            },
            ApiError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "storage_error"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };

        let body = Json(json!({
            "error": {
                "type": error_type,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;
