//! Error-to-response mapping
//!
//! Each `AppError` variant maps to exactly one status code. Internal and
//! database failures are logged and collapsed into a generic message so
//! storage details never reach clients.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::errors::AppError;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message.clone()),
            AppError::Validation { message } => {
                (StatusCode::UNPROCESSABLE_ENTITY, message.clone())
            }
            AppError::NotFound { resource, id } => (
                StatusCode::NOT_FOUND,
                format!("{resource} {id} not found"),
            ),
            AppError::Forbidden { action, resource } => (
                StatusCode::FORBIDDEN,
                format!("not allowed to {action} this {resource}"),
            ),
            AppError::Conflict { message, .. } => (StatusCode::CONFLICT, message.clone()),
            AppError::Delivery { channel, message } => {
                error!("Notification delivery failed ({}): {}", channel, message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("{channel} delivery failed: {message}"),
                )
            }
            AppError::Internal { message } => {
                error!("Internal error: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
