//! Request context extraction
//!
//! Authentication itself happens upstream; the gateway attaches the caller's
//! id and admin flag as headers. This extractor only parses them into an
//! explicit `Caller` value so no handler depends on an implicit user.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::Caller;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ADMIN_HEADER: &str = "x-user-admin";

#[derive(Debug, Clone, Copy)]
pub struct RequestContext {
    pub caller: Caller,
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::bad_request("Missing x-user-id header"))?;
        let user_id: Uuid = user_id
            .parse()
            .map_err(|_| AppError::bad_request("Invalid x-user-id header"))?;

        let is_admin = parts
            .headers
            .get(USER_ADMIN_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        Ok(RequestContext {
            caller: Caller { user_id, is_admin },
        })
    }
}
