//! Invitation repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use warden_core::error::{AppError, ErrorKind};
use warden_core::result::AppResult;
use warden_entity::invitation::{CreateInvitation, Invitation, InvitationStatus};

/// Persisted invitations.
///
/// The "one open invitation per email" rule lives here as conditional
/// writes rather than a schema constraint.
#[async_trait]
pub trait InvitationRepository: Send + Sync + std::fmt::Debug {
    /// Most recent invitation for `email`, if any.
    async fn find_latest_by_email(&self, email: &str) -> AppResult<Option<Invitation>>;

    /// Invitation holding `token`, if any.
    async fn find_by_token(&self, token: &str) -> AppResult<Option<Invitation>>;

    /// Insert a pending invitation unless any invitation already exists for
    /// the email. Returns `None` when the insert was refused.
    async fn create_if_vacant(
        &self,
        input: &CreateInvitation,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Invitation>>;

    /// Replace token and expiry of a pending invitation whose token has
    /// expired. Returns `None` if the row is no longer pending-and-expired.
    async fn refresh_expired(
        &self,
        id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Invitation>>;

    /// Move the invitation holding `token` from pending to accepted if it is
    /// unexpired. Returns `None` when the transition did not happen.
    async fn accept(&self, token: &str, now: DateTime<Utc>) -> AppResult<Option<Invitation>>;

    /// Record when the invitation email was handed off.
    async fn mark_email_sent(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<()>;
}

/// PostgreSQL-backed invitation repository.
#[derive(Debug, Clone)]
pub struct PgInvitationRepository {
    pool: PgPool,
}

impl PgInvitationRepository {
    /// Create a new invitation repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InvitationRepository for PgInvitationRepository {
    async fn find_latest_by_email(&self, email: &str) -> AppResult<Option<Invitation>> {
        sqlx::query_as::<_, Invitation>(
            "SELECT * FROM invitations WHERE email = $1 ORDER BY created_at DESC LIMIT 1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to find invitation", e))
    }

    async fn find_by_token(&self, token: &str) -> AppResult<Option<Invitation>> {
        sqlx::query_as::<_, Invitation>("SELECT * FROM invitations WHERE token = $1")
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Storage, "Failed to find invitation by token", e)
            })
    }

    async fn create_if_vacant(
        &self,
        input: &CreateInvitation,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Invitation>> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to begin invitation insert", e)
        })?;

        // Serializes concurrent creates for the same address.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(&input.email)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Storage, "Failed to lock invitation email", e)
            })?;

        let invitation = sqlx::query_as::<_, Invitation>(
            "INSERT INTO invitations \
             (id, inviter_id, email, token, status, expires_at, created_at, updated_at) \
             SELECT $1, $2, $3, $4, $5, $6, $7, $7 \
             WHERE NOT EXISTS (SELECT 1 FROM invitations WHERE email = $3) \
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(input.inviter_id)
        .bind(&input.email)
        .bind(&input.token)
        .bind(InvitationStatus::Pending)
        .bind(input.expires_at)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to create invitation", e))?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to commit invitation insert", e)
        })?;

        Ok(invitation)
    }

    async fn refresh_expired(
        &self,
        id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Invitation>> {
        sqlx::query_as::<_, Invitation>(
            "UPDATE invitations SET token = $2, expires_at = $3, email_sent_at = NULL, updated_at = $4 \
             WHERE id = $1 AND status = $5 AND expires_at <= $4 \
             RETURNING *",
        )
        .bind(id)
        .bind(token)
        .bind(expires_at)
        .bind(now)
        .bind(InvitationStatus::Pending)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to refresh invitation", e))
    }

    async fn accept(&self, token: &str, now: DateTime<Utc>) -> AppResult<Option<Invitation>> {
        sqlx::query_as::<_, Invitation>(
            "UPDATE invitations SET status = $3, updated_at = $2 \
             WHERE token = $1 AND status = $4 AND expires_at > $2 \
             RETURNING *",
        )
        .bind(token)
        .bind(now)
        .bind(InvitationStatus::Accepted)
        .bind(InvitationStatus::Pending)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to accept invitation", e))
    }

    async fn mark_email_sent(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<()> {
        sqlx::query("UPDATE invitations SET email_sent_at = $2, updated_at = $2 WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Storage, "Failed to mark invitation sent", e)
            })?;
        Ok(())
    }
}
