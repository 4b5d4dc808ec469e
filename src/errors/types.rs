//! Error type definitions for the booking service
//!
//! The service exposes a small, fixed taxonomy: every operation failure maps
//! onto one of these variants, and the web layer maps each variant onto a
//! single HTTP status code. Unexpected storage failures collapse into
//! `Internal` so internals never leak to clients.

use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing or unusable request context (mapped to 400)
    #[error("Bad request: {message}")]
    BadRequest { message: String },

    /// Payload failed schema validation (mapped to 422)
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Resource not found (mapped to 404)
    #[error("Not found: {resource} with id {id}")]
    NotFound { resource: String, id: String },

    /// Caller lacks rights for the operation (mapped to 403)
    #[error("Forbidden: {action} on {resource}")]
    Forbidden { action: String, resource: String },

    /// Illegal lifecycle transition (mapped to 409)
    #[error("Conflict: {resource} - {message}")]
    Conflict { resource: String, message: String },

    /// Downstream notification delivery failure (mapped to 500, structured)
    #[error("Delivery failed: {channel} - {message}")]
    Delivery { channel: String, message: String },

    /// Unexpected internal failure (mapped to 500, details logged only)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Convenience constructors for common error shapes
impl AppError {
    pub fn bad_request<S: Into<String>>(message: S) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn not_found<R: Into<String>, I: Into<String>>(resource: R, id: I) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.into(),
        }
    }

    pub fn forbidden<A: Into<String>, R: Into<String>>(action: A, resource: R) -> Self {
        Self::Forbidden {
            action: action.into(),
            resource: resource.into(),
        }
    }

    pub fn conflict<R: Into<String>, M: Into<String>>(resource: R, message: M) -> Self {
        Self::Conflict {
            resource: resource.into(),
            message: message.into(),
        }
    }

    pub fn delivery<C: Into<String>, M: Into<String>>(channel: C, message: M) -> Self {
        Self::Delivery {
            channel: channel.into(),
            message: message.into(),
        }
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        Self::Internal {
            message: format!("database error: {err}"),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal {
            message: err.to_string(),
        }
    }
}
