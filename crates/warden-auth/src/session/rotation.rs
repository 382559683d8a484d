//! Refresh-token rotation with reuse detection.
//!
//! A presented refresh token is classified against its stored session and
//! handled as follows:
//!
//! | State    | Condition                         | Outcome                                  |
//! |----------|-----------------------------------|------------------------------------------|
//! | Unknown  | no session for the digest         | `UnknownToken`                           |
//! | Reused   | session revoked                   | revoke all user sessions, audit, `ReuseDetected` |
//! | Expired  | not revoked, `expires_at <= now`  | `ExpiredToken`, session left for the sweep |
//! | Valid    | active                            | revoke + replace in one unit, new tokens |
//!
//! Revocation is a conditional transition. When two callers race on the
//! same still-valid token, only the one whose revoke lands mints a
//! replacement; the other is treated exactly like a replay.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use warden_core::config::AuthConfig;
use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_core::traits::Clock;
use warden_database::repositories::AuditRepository;
use warden_entity::audit::{CreateSecurityAuditRecord, SecurityEvent};
use warden_entity::session::{ClientTag, CreateSession, Session};

use crate::jwt::JwtEncoder;
use crate::token::{MintedToken, hash_token};

use super::store::SessionStore;

/// State of a presented refresh token at the moment it is exchanged.
#[derive(Debug, Clone)]
pub enum TokenState {
    /// No session carries this digest.
    Unknown,
    /// The session was already revoked.
    Reused(Session),
    /// The session is unrevoked but past its expiry.
    Expired(Session),
    /// The session is active.
    Valid(Session),
}

impl TokenState {
    /// Classifies a lookup result at `now`. Revocation wins over expiry.
    pub fn classify(found: Option<Session>, now: DateTime<Utc>) -> Self {
        match found {
            None => Self::Unknown,
            Some(session) if session.is_revoked() => Self::Reused(session),
            Some(session) if session.is_expired(now) => Self::Expired(session),
            Some(session) => Self::Valid(session),
        }
    }
}

/// Credentials handed to a client after login or rotation.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    /// Owning user.
    pub user_id: Uuid,
    /// The session backing the refresh token.
    pub session_id: Uuid,
    /// Signed access token.
    pub access_token: String,
    /// Access token expiry.
    pub access_expires_at: DateTime<Utc>,
    /// Raw refresh token; never stored.
    pub refresh_token: String,
    /// Refresh token (session) expiry.
    pub refresh_expires_at: DateTime<Utc>,
}

/// Opens sessions and exchanges refresh tokens.
#[derive(Debug, Clone)]
pub struct RotationProtocol {
    store: Arc<SessionStore>,
    audit: Arc<dyn AuditRepository>,
    encoder: Arc<JwtEncoder>,
    clock: Arc<dyn Clock>,
    refresh_ttl: Duration,
    token_bytes: usize,
}

impl RotationProtocol {
    /// Creates a new rotation protocol.
    pub fn new(
        store: Arc<SessionStore>,
        audit: Arc<dyn AuditRepository>,
        encoder: Arc<JwtEncoder>,
        clock: Arc<dyn Clock>,
        config: &AuthConfig,
    ) -> Self {
        Self {
            store,
            audit,
            encoder,
            clock,
            refresh_ttl: Duration::days(config.refresh_ttl_days as i64),
            token_bytes: config.refresh_token_bytes,
        }
    }

    /// Creates the first session for a freshly authenticated user.
    pub async fn open(&self, user_id: Uuid, client: &ClientTag) -> AppResult<IssuedSession> {
        let now = self.clock.now();
        let access = self.encoder.issue_access_token(user_id)?;
        let minted = MintedToken::generate(self.token_bytes);

        let session = self
            .store
            .create(&self.replacement_for(user_id, &minted, client, now), now)
            .await?;

        info!(
            user_id = %user_id,
            session_id = %session.id,
            client = %client,
            "Session opened"
        );

        Ok(IssuedSession {
            user_id,
            session_id: session.id,
            access_token: access.token,
            access_expires_at: access.expires_at,
            refresh_token: minted.raw,
            refresh_expires_at: session.expires_at,
        })
    }

    /// Exchanges a raw refresh token for a new refresh token and access token.
    pub async fn exchange(&self, raw: &str, client: &ClientTag) -> AppResult<IssuedSession> {
        let now = self.clock.now();
        let found = self.store.find_by_hash(&hash_token(raw)).await?;

        match TokenState::classify(found, now) {
            TokenState::Unknown => {
                debug!(client = %client, "Unknown refresh token presented");
                Err(AppError::unknown_token())
            }
            TokenState::Reused(session) => Err(self.respond_to_reuse(&session, client, now).await),
            TokenState::Expired(session) => {
                debug!(
                    user_id = %session.user_id,
                    session_id = %session.id,
                    expired_at = %session.expires_at,
                    "Expired refresh token presented"
                );
                Err(AppError::expired_token())
            }
            TokenState::Valid(session) => self.rotate(session, client, now).await,
        }
    }

    async fn rotate(
        &self,
        mut session: Session,
        client: &ClientTag,
        now: DateTime<Utc>,
    ) -> AppResult<IssuedSession> {
        let access = self.encoder.issue_access_token(session.user_id)?;
        let minted = MintedToken::generate(self.token_bytes);
        let replacement = self.replacement_for(session.user_id, &minted, client, now);

        let Some(new_session) = self
            .store
            .rotate(&session.token_hash, &replacement, now)
            .await?
        else {
            // Another caller revoked this session between lookup and rotate.
            let revoked_at = self
                .store
                .find_by_hash(&session.token_hash)
                .await?
                .and_then(|s| s.revoked_at);
            session.revoked_at = revoked_at.or(Some(now));
            return Err(self.respond_to_reuse(&session, client, now).await);
        };

        info!(
            user_id = %session.user_id,
            old_session_id = %session.id,
            new_session_id = %new_session.id,
            "Refresh token rotated"
        );

        Ok(IssuedSession {
            user_id: session.user_id,
            session_id: new_session.id,
            access_token: access.token,
            access_expires_at: access.expires_at,
            refresh_token: minted.raw,
            refresh_expires_at: new_session.expires_at,
        })
    }

    /// Compromise response: revoke every session of the user, leave an
    /// audit trail, and report reuse. A failed mass revocation surfaces as
    /// the storage error instead.
    async fn respond_to_reuse(
        &self,
        session: &Session,
        presented_by: &ClientTag,
        now: DateTime<Utc>,
    ) -> AppError {
        let revoked = match self.store.revoke_all_for_user(session.user_id, now).await {
            Ok(count) => count,
            Err(e) => {
                error!(
                    user_id = %session.user_id,
                    error = %e,
                    "Failed to revoke sessions after refresh token reuse"
                );
                return e;
            }
        };

        warn!(
            user_id = %session.user_id,
            session_id = %session.id,
            issued_to = %session.client_tag(),
            presented_by = %presented_by,
            original_revoked_at = ?session.revoked_at,
            sessions_revoked = revoked,
            "Refresh token reuse detected, all sessions revoked"
        );

        let record = CreateSecurityAuditRecord {
            user_id: session.user_id,
            event: SecurityEvent::RefreshTokenReuse,
            user_agent: session.user_agent.clone(),
            ip_address: session.ip_address.clone(),
            presented_user_agent: presented_by.user_agent.clone(),
            presented_ip_address: presented_by.ip_address.clone(),
            original_revoked_at: session.revoked_at,
            sessions_revoked: revoked as i64,
        };
        if let Err(e) = self.audit.record(&record, now).await {
            error!(
                user_id = %session.user_id,
                error = %e,
                "Failed to write security audit record"
            );
        }

        AppError::reuse_detected()
    }

    fn replacement_for(
        &self,
        user_id: Uuid,
        minted: &MintedToken,
        client: &ClientTag,
        now: DateTime<Utc>,
    ) -> CreateSession {
        CreateSession {
            user_id,
            token_hash: minted.hash.clone(),
            client: client.clone(),
            expires_at: now + self.refresh_ttl,
        }
    }
}
