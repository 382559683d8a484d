//! In-memory invitation repository.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use warden_core::result::AppResult;
use warden_entity::invitation::{CreateInvitation, Invitation, InvitationStatus};

use crate::repositories::InvitationRepository;

/// Invitations in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemoryInvitationRepository {
    invitations: Arc<Mutex<Vec<Invitation>>>,
}

impl MemoryInvitationRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl InvitationRepository for MemoryInvitationRepository {
    async fn find_latest_by_email(&self, email: &str) -> AppResult<Option<Invitation>> {
        let invitations = self.invitations.lock().await;
        Ok(invitations
            .iter()
            .filter(|i| i.email == email)
            .max_by_key(|i| i.created_at)
            .cloned())
    }

    async fn find_by_token(&self, token: &str) -> AppResult<Option<Invitation>> {
        let invitations = self.invitations.lock().await;
        Ok(invitations.iter().find(|i| i.token == token).cloned())
    }

    async fn create_if_vacant(
        &self,
        input: &CreateInvitation,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Invitation>> {
        let mut invitations = self.invitations.lock().await;
        if invitations.iter().any(|i| i.email == input.email) {
            return Ok(None);
        }
        let invitation = Invitation {
            id: Uuid::new_v4(),
            inviter_id: input.inviter_id,
            email: input.email.clone(),
            token: input.token.clone(),
            status: InvitationStatus::Pending,
            expires_at: input.expires_at,
            email_sent_at: None,
            created_at: now,
            updated_at: now,
        };
        invitations.push(invitation.clone());
        Ok(Some(invitation))
    }

    async fn refresh_expired(
        &self,
        id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Invitation>> {
        let mut invitations = self.invitations.lock().await;
        let Some(invitation) = invitations
            .iter_mut()
            .find(|i| i.id == id && i.is_pending() && i.is_expired(now))
        else {
            return Ok(None);
        };
        invitation.token = token.to_string();
        invitation.expires_at = expires_at;
        invitation.email_sent_at = None;
        invitation.updated_at = now;
        Ok(Some(invitation.clone()))
    }

    async fn accept(&self, token: &str, now: DateTime<Utc>) -> AppResult<Option<Invitation>> {
        let mut invitations = self.invitations.lock().await;
        let Some(invitation) = invitations
            .iter_mut()
            .find(|i| i.token == token && i.is_open(now))
        else {
            return Ok(None);
        };
        invitation.status = InvitationStatus::Accepted;
        invitation.updated_at = now;
        Ok(Some(invitation.clone()))
    }

    async fn mark_email_sent(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<()> {
        let mut invitations = self.invitations.lock().await;
        if let Some(invitation) = invitations.iter_mut().find(|i| i.id == id) {
            invitation.email_sent_at = Some(at);
            invitation.updated_at = at;
        }
        Ok(())
    }
}
