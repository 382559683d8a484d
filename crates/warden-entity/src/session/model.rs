//! Session entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::client::ClientTag;

/// One issued refresh token.
///
/// Only the SHA-256 digest of the raw token is stored. `revoked_at` is set
/// at most once and is never cleared; revoked rows stay in the table until
/// they expire so that a replayed token can still be recognized.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Session {
    /// Unique session identifier.
    pub id: Uuid,
    /// The user this session belongs to.
    pub user_id: Uuid,
    /// Hex SHA-256 digest of the raw refresh token.
    pub token_hash: String,
    /// User-Agent of the client that obtained the token.
    pub user_agent: Option<String>,
    /// Address of the client that obtained the token.
    pub ip_address: Option<String>,
    /// Absolute expiry, fixed at creation.
    pub expires_at: DateTime<Utc>,
    /// When the session was revoked, if ever.
    pub revoked_at: Option<DateTime<Utc>>,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
    /// Last modification (creation or revocation).
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Active iff not revoked and not yet expired at `now`.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.revoked_at.is_none() && self.expires_at > now
    }

    /// Whether the session has been revoked.
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    /// Whether the session is past its expiry at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// The client that obtained this session.
    pub fn client_tag(&self) -> ClientTag {
        ClientTag::new(self.user_agent.clone(), self.ip_address.clone())
    }
}

/// Data required to create a new session.
#[derive(Debug, Clone)]
pub struct CreateSession {
    /// Owning user.
    pub user_id: Uuid,
    /// Digest of the new raw token.
    pub token_hash: String,
    /// Issuing client.
    pub client: ClientTag,
    /// Absolute expiry.
    pub expires_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn session(expires_at: DateTime<Utc>, revoked_at: Option<DateTime<Utc>>) -> Session {
        let now = Utc::now();
        Session {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            token_hash: "abc".to_string(),
            user_agent: Some("curl/8".to_string()),
            ip_address: Some("10.0.0.1".to_string()),
            expires_at,
            revoked_at,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn activity_requires_unrevoked_and_unexpired() {
        let now = Utc::now();
        assert!(session(now + Duration::days(1), None).is_active(now));
        assert!(!session(now + Duration::days(1), Some(now)).is_active(now));
        assert!(!session(now, None).is_active(now));
        assert!(session(now, None).is_expired(now));
    }

    #[test]
    fn client_tag_reflects_row() {
        let s = session(Utc::now(), None);
        let tag = s.client_tag();
        assert_eq!(tag.ip_address.as_deref(), Some("10.0.0.1"));
        assert_eq!(tag.to_string(), "10.0.0.1 (curl/8)");
    }
}
