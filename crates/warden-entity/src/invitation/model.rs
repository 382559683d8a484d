//! Invitation entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::status::InvitationStatus;

/// A single-use invitation for an email address.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Invitation {
    /// Unique invitation identifier.
    pub id: Uuid,
    /// The user who issued the invitation.
    pub inviter_id: Uuid,
    /// Invitee address.
    pub email: String,
    /// Raw acceptance token.
    #[serde(skip_serializing)]
    pub token: String,
    /// Current status.
    pub status: InvitationStatus,
    /// When the current token stops being acceptable.
    pub expires_at: DateTime<Utc>,
    /// When the invitation email was handed to the mail outbox.
    pub email_sent_at: Option<DateTime<Utc>>,
    /// When the invitation was created.
    pub created_at: DateTime<Utc>,
    /// Last modification.
    pub updated_at: DateTime<Utc>,
}

impl Invitation {
    /// Whether the invitation is still pending.
    pub fn is_pending(&self) -> bool {
        self.status == InvitationStatus::Pending
    }

    /// Whether the current token has expired at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Pending and unexpired at `now`.
    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        self.is_pending() && !self.is_expired(now)
    }
}

/// Data required to create a new pending invitation.
#[derive(Debug, Clone)]
pub struct CreateInvitation {
    /// Issuing user.
    pub inviter_id: Uuid,
    /// Invitee address, already normalized.
    pub email: String,
    /// Raw acceptance token.
    pub token: String,
    /// Token expiry.
    pub expires_at: DateTime<Utc>,
}
