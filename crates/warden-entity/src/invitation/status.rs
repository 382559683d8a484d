//! Invitation status enumeration.

use serde::{Deserialize, Serialize};

/// Lifecycle state of an invitation. `Accepted` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "invitation_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    /// Issued and awaiting acceptance (possibly expired by time).
    Pending,
    /// Accepted by the invitee.
    Accepted,
}
