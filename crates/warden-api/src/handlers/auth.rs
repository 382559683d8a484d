//! Auth handlers: register, login, refresh, logout, me.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum_extra::extract::cookie::CookieJar;

use warden_auth::IssuedSession;
use warden_core::error::AppError;

use crate::cookie::{REFRESH_COOKIE, refresh_cookie, refresh_cookie_removal};
use crate::dto::request::{LoginRequest, RegisterRequest};
use crate::dto::response::{AccessTokenResponse, UserResponse};
use crate::dto::validate_body;
use crate::error::ApiError;
use crate::extractors::{AuthUser, ClientInfo};
use crate::state::AppState;

/// Puts the refresh token in the cookie jar and the access token in the body.
fn issue(
    state: &AppState,
    jar: CookieJar,
    issued: IssuedSession,
) -> (CookieJar, Json<AccessTokenResponse>) {
    let secure = state.config.server.is_production();
    let jar = jar.add(refresh_cookie(
        issued.refresh_token,
        issued.refresh_expires_at,
        secure,
    ));
    (
        jar,
        Json(AccessTokenResponse {
            access_token: issued.access_token,
        }),
    )
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let user = state.account_service.register(req.into()).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    ClientInfo(client): ClientInfo,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<AccessTokenResponse>), ApiError> {
    validate_body(&req)?;

    let issued = state
        .session_manager
        .login(&req.email, &req.password, &client)
        .await?;

    Ok(issue(&state, jar, issued))
}

/// POST /api/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    ClientInfo(client): ClientInfo,
    jar: CookieJar,
) -> Result<(CookieJar, Json<AccessTokenResponse>), ApiError> {
    let raw = jar
        .get(REFRESH_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or_else(AppError::unknown_token)?;

    let issued = state.session_manager.refresh(&raw, &client).await?;
    Ok(issue(&state, jar, issued))
}

/// POST /api/auth/logout
///
/// Always answers 204 and clears the cookie, whatever the store says.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, StatusCode) {
    let raw = jar.get(REFRESH_COOKIE).map(|c| c.value().to_string());
    state.session_manager.logout(raw.as_deref()).await;

    let secure = state.config.server.is_production();
    (jar.add(refresh_cookie_removal(secure)), StatusCode::NO_CONTENT)
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.account_service.profile(auth.user_id).await?;
    Ok(Json(user.into()))
}
