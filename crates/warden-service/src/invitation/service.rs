//! Invitation service.
//!
//! An email moves through `pending` (fresh or expired by time) to
//! `accepted`, which is terminal. Each state transition is a conditional
//! write in the repository, so concurrent callers cannot both win.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{error, info};
use uuid::Uuid;

use warden_auth::{generate_opaque_token, normalize_email};
use warden_core::config::{InvitationConfig, MailConfig};
use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_core::traits::Clock;
use warden_database::repositories::InvitationRepository;
use warden_entity::invitation::{CreateInvitation, Invitation};

use crate::mail::{MailOutbox, invitation_email};

const ALREADY_ACCEPTED: &str = "This user has already accepted an invitation";
const ACTIVE_PENDING: &str = "An active invitation is pending";
const EXPIRED_OR_USED: &str = "Invitation expired or already used";

/// Issues, resends, and accepts invitations.
#[derive(Debug, Clone)]
pub struct InvitationService {
    /// Invitation repository.
    repo: Arc<dyn InvitationRepository>,
    /// Queue to the mail delivery worker.
    outbox: MailOutbox,
    /// Time source.
    clock: Arc<dyn Clock>,
    /// Token lifetime.
    ttl: Duration,
    /// Invitation token length in random bytes.
    token_bytes: usize,
    /// Public base URL used in the acceptance link.
    base_url: String,
}

impl InvitationService {
    /// Creates a new invitation service.
    pub fn new(
        repo: Arc<dyn InvitationRepository>,
        outbox: MailOutbox,
        clock: Arc<dyn Clock>,
        config: &InvitationConfig,
        mail: &MailConfig,
    ) -> Self {
        Self {
            repo,
            outbox,
            clock,
            ttl: Duration::hours(config.ttl_hours as i64),
            token_bytes: config.token_bytes,
            base_url: mail.base_url.clone(),
        }
    }

    /// Invites `email` on behalf of `inviter_id`.
    ///
    /// An expired pending invitation is transparently reissued with a new
    /// token and expiry. A live or accepted invitation refuses the call.
    pub async fn create(&self, inviter_id: Uuid, email: &str) -> AppResult<Invitation> {
        let email = normalize_email(email);
        let now = self.clock.now();

        match self.repo.find_latest_by_email(&email).await? {
            Some(existing) if !existing.is_pending() => {
                Err(AppError::validation(ALREADY_ACCEPTED))
            }
            Some(existing) if !existing.is_expired(now) => {
                Err(AppError::validation(ACTIVE_PENDING))
            }
            Some(existing) => self.resend(existing, now).await,
            None => self.issue(inviter_id, email, now).await,
        }
    }

    async fn issue(
        &self,
        inviter_id: Uuid,
        email: String,
        now: DateTime<Utc>,
    ) -> AppResult<Invitation> {
        let input = CreateInvitation {
            inviter_id,
            email,
            token: generate_opaque_token(self.token_bytes),
            expires_at: now + self.ttl,
        };

        let invitation = self
            .repo
            .create_if_vacant(&input, now)
            .await?
            .ok_or_else(|| AppError::validation(ACTIVE_PENDING))?;

        info!(
            invitation_id = %invitation.id,
            inviter_id = %inviter_id,
            email = %invitation.email,
            "Invitation created"
        );

        self.dispatch(invitation, now).await
    }

    async fn resend(&self, expired: Invitation, now: DateTime<Utc>) -> AppResult<Invitation> {
        let token = generate_opaque_token(self.token_bytes);

        let invitation = self
            .repo
            .refresh_expired(expired.id, &token, now + self.ttl, now)
            .await?
            .ok_or_else(|| AppError::validation(ACTIVE_PENDING))?;

        info!(
            invitation_id = %invitation.id,
            email = %invitation.email,
            previous_expiry = %expired.expires_at,
            "Expired invitation reissued"
        );

        self.dispatch(invitation, now).await
    }

    /// Queues the invitation email and records the hand-off. A failed
    /// hand-off is logged; the invitation itself stands.
    async fn dispatch(
        &self,
        mut invitation: Invitation,
        now: DateTime<Utc>,
    ) -> AppResult<Invitation> {
        let message = invitation_email(
            &self.base_url,
            &invitation.email,
            &invitation.token,
            self.ttl.num_hours() as u64,
        );

        if let Err(e) = self.outbox.hand_off(message) {
            error!(
                invitation_id = %invitation.id,
                error = %e,
                "Failed to queue invitation email"
            );
            return Ok(invitation);
        }

        self.repo.mark_email_sent(invitation.id, now).await?;
        invitation.email_sent_at = Some(now);
        Ok(invitation)
    }

    /// Accepts the invitation holding `token`.
    pub async fn accept(&self, token: Option<&str>) -> AppResult<Invitation> {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::bad_request("token is required"))?;
        let now = self.clock.now();

        let invitation = self
            .repo
            .find_by_token(token)
            .await?
            .ok_or_else(|| AppError::not_found("Invitation not found"))?;

        if !invitation.is_open(now) {
            return Err(AppError::validation(EXPIRED_OR_USED));
        }

        let accepted = self
            .repo
            .accept(token, now)
            .await?
            .ok_or_else(|| AppError::validation(EXPIRED_OR_USED))?;

        info!(
            invitation_id = %accepted.id,
            email = %accepted.email,
            "Invitation accepted"
        );

        Ok(accepted)
    }

    /// Fails unless the latest invitation for `email` has been accepted.
    pub async fn ensure_accepted(&self, email: &str) -> AppResult<()> {
        let email = normalize_email(email);
        match self.repo.find_latest_by_email(&email).await? {
            None => Err(AppError::validation("No invitation found for this email")),
            Some(invitation) if invitation.is_pending() => Err(AppError::validation(
                "Invitation has not been accepted yet",
            )),
            Some(_) => Ok(()),
        }
    }
}
