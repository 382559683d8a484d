//! Security audit record entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Kinds of security events that get a durable audit record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityEvent {
    /// A revoked refresh token was presented and every session was revoked.
    RefreshTokenReuse,
}

impl SecurityEvent {
    /// Stored event name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RefreshTokenReuse => "refresh_token_reuse",
        }
    }
}

impl std::fmt::Display for SecurityEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An immutable audit record of a security event.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SecurityAuditRecord {
    /// Unique record identifier.
    pub id: Uuid,
    /// Affected account.
    pub user_id: Uuid,
    /// Event name, see [`SecurityEvent::as_str`].
    pub event: String,
    /// User-Agent recorded on the compromised session.
    pub user_agent: Option<String>,
    /// Address recorded on the compromised session.
    pub ip_address: Option<String>,
    /// User-Agent of the client that presented the revoked token.
    pub presented_user_agent: Option<String>,
    /// Address of the client that presented the revoked token.
    pub presented_ip_address: Option<String>,
    /// When the presented session had originally been revoked.
    pub original_revoked_at: Option<DateTime<Utc>>,
    /// How many sessions the compromise response revoked.
    pub sessions_revoked: i64,
    /// When the event was recorded.
    pub created_at: DateTime<Utc>,
}

/// Data required to record a security event.
#[derive(Debug, Clone)]
pub struct CreateSecurityAuditRecord {
    /// Affected account.
    pub user_id: Uuid,
    /// What happened.
    pub event: SecurityEvent,
    /// User-Agent recorded on the compromised session.
    pub user_agent: Option<String>,
    /// Address recorded on the compromised session.
    pub ip_address: Option<String>,
    /// User-Agent of the presenting client.
    pub presented_user_agent: Option<String>,
    /// Address of the presenting client.
    pub presented_ip_address: Option<String>,
    /// Original revocation time of the presented session.
    pub original_revoked_at: Option<DateTime<Utc>>,
    /// Sessions revoked by the response.
    pub sessions_revoked: i64,
}
