//! Custom Axum extractors
//!
//! The signed-in user arrives in the `x-user-id` header, set by the
//! authenticating proxy in front of the service.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use super::error::ApiError;

/// Header carrying the signed-in user's id
pub const USER_HEADER: &str = "x-user-id";

fn user_from_parts(parts: &Parts) -> Option<Uuid> {
    parts
        .headers
        .get(USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| Uuid::parse_str(v.trim()).ok())
}

/// Signed-in user; rejects with 401 when absent or malformed
pub struct RequireUser(pub Uuid);

impl<S> FromRequestParts<S> for RequireUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        user_from_parts(parts)
            .map(Self)
            .ok_or(ApiError::Unauthorized)
    }
}

/// Signed-in user if any; forms report a missing user as a field error
pub struct MaybeUser(pub Option<Uuid>);

impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(user_from_parts(parts)))
    }
}

/// Parse an id taken from the path; malformed ids cannot name a row.
pub fn path_id(resource: &'static str, raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::not_found(resource, raw))
}
