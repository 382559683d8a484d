//! Login, refresh, logout, and access token authentication.

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_core::traits::Clock;
use warden_database::repositories::UserRepository;
use warden_entity::session::ClientTag;

use crate::jwt::JwtDecoder;
use crate::password::PasswordHasher;
use crate::token::hash_token;

use super::rotation::{IssuedSession, RotationProtocol};
use super::store::SessionStore;

/// Entry point for everything a client does with its credentials.
#[derive(Debug, Clone)]
pub struct SessionManager {
    users: Arc<dyn UserRepository>,
    hasher: Arc<PasswordHasher>,
    store: Arc<SessionStore>,
    rotation: Arc<RotationProtocol>,
    decoder: Arc<JwtDecoder>,
    clock: Arc<dyn Clock>,
}

impl SessionManager {
    /// Creates a new session manager.
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: Arc<PasswordHasher>,
        store: Arc<SessionStore>,
        rotation: Arc<RotationProtocol>,
        decoder: Arc<JwtDecoder>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            hasher,
            store,
            rotation,
            decoder,
            clock,
        }
    }

    /// Verifies email and password and opens a new session.
    ///
    /// Unknown email and wrong password fail identically.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        client: &ClientTag,
    ) -> AppResult<IssuedSession> {
        let email = normalize_email(email);

        let Some(user) = self.users.find_by_email(&email).await? else {
            debug!(client = %client, "Login for unknown email");
            return Err(AppError::invalid_credentials());
        };

        if !self.hasher.verify_password(password, &user.password_hash) {
            warn!(user_id = %user.id, client = %client, "Login with wrong password");
            return Err(AppError::invalid_credentials());
        }

        let issued = self.rotation.open(user.id, client).await?;
        info!(user_id = %user.id, username = %user.username, "User logged in");
        Ok(issued)
    }

    /// Exchanges a refresh token for a fresh pair.
    pub async fn refresh(&self, raw: &str, client: &ClientTag) -> AppResult<IssuedSession> {
        if raw.is_empty() {
            return Err(AppError::unknown_token());
        }
        self.rotation.exchange(raw, client).await
    }

    /// Revokes the session behind `raw`, if any.
    ///
    /// Always succeeds from the caller's point of view; store failures are
    /// logged and swallowed.
    pub async fn logout(&self, raw: Option<&str>) {
        let Some(raw) = raw.filter(|r| !r.is_empty()) else {
            debug!("Logout without a refresh token");
            return;
        };

        match self.store.revoke(&hash_token(raw), self.clock.now()).await {
            Ok(true) => info!("Session revoked on logout"),
            Ok(false) => debug!("Logout for an unknown or already revoked session"),
            Err(e) => warn!(error = %e, "Failed to revoke session on logout"),
        }
    }

    /// Verifies an access token and returns the user it was issued to.
    pub fn authenticate(&self, access_token: &str) -> AppResult<Uuid> {
        self.decoder.verify_access_token(access_token)
    }
}

/// Lowercases and trims an email address for lookup and storage.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
