//! `AuthUser` extractor: pulls the bearer token from the Authorization
//! header and verifies it.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use uuid::Uuid;

use warden_core::error::AppError;

use crate::error::ApiError;
use crate::state::AppState;

/// The authenticated principal. Handlers that take this argument are
/// only reached with a valid, unexpired access token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    /// User the access token was issued to.
    pub user_id: Uuid,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::invalid_token("Missing Authorization header"))?;

        let token = header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::invalid_token("Invalid Authorization header format"))?;

        let user_id = state.session_manager.authenticate(token)?;
        Ok(Self { user_id })
    }
}
