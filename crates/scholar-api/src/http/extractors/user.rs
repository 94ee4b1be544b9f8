//! Caller identity extractor.
//!
//! Authentication happens in the upstream gateway, which forwards the
//! verified user id in the `X-User-Id` header.

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::http::error::AppError;

pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated caller's user id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserId(pub Uuid);

impl<S: Send + Sync> FromRequestParts<S> for UserId {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        user_id_from_headers(&parts.headers).map(UserId)
    }
}

fn user_id_from_headers(headers: &HeaderMap) -> Result<Uuid, AppError> {
    let value = headers
        .get(USER_ID_HEADER)
        .ok_or_else(|| AppError::Unauthorized("Missing X-User-Id header".to_string()))?;
    let raw = value
        .to_str()
        .map_err(|_| AppError::Unauthorized("Invalid X-User-Id header encoding".to_string()))?;

    raw.trim()
        .parse::<Uuid>()
        .map_err(|_| AppError::Unauthorized(format!("X-User-Id is not a UUID: {raw}")))
}
