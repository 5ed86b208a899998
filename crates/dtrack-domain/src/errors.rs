//! Domain errors for DTrack

use thiserror::Error;

use crate::value_objects::DefectStatus;

/// Core domain errors
///
/// Variants map 1:1 onto the error classes the transport layer
/// understands: validation, authorization, not-found, conflict and
/// infrastructure failure.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Validation failed: {field} - {reason}")]
    Validation { field: String, reason: String },

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Not allowed: {reason}")]
    Authorization { reason: String },

    #[error("Entity not found: {entity} with id {id}")]
    EntityNotFound { entity: &'static str, id: String },

    #[error("Status transition {from} -> {to} is not allowed")]
    TransitionDenied {
        from: DefectStatus,
        to: DefectStatus,
    },

    #[error("Concurrency conflict: {resource}")]
    ConcurrencyConflict { resource: String },

    #[error("User with email {email} already exists")]
    EmailAlreadyExists { email: String },

    #[error("Refresh token expired")]
    TokenExpired,

    #[error("Repository failure: {reason}")]
    Repository { reason: String },
}

impl DomainError {
    /// Shorthand for a validation failure on a named field
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for an authorization failure
    pub fn authorization(reason: impl Into<String>) -> Self {
        Self::Authorization {
            reason: reason.into(),
        }
    }

    /// Shorthand for a missing entity
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::EntityNotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Shorthand for an infrastructure failure at the repository boundary
    pub fn repository(reason: impl Into<String>) -> Self {
        Self::Repository {
            reason: reason.into(),
        }
    }
}

/// Result type alias for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
