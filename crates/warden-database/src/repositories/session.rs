//! Session repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use warden_core::error::{AppError, ErrorKind};
use warden_core::result::AppResult;
use warden_entity::session::{CreateSession, Session};

use super::is_unique_violation;

/// Persisted refresh-token sessions.
///
/// `find_by_hash` returns revoked rows too: reuse detection depends on
/// seeing a dead session. `revoke` and `rotate` are conditional and report
/// whether this caller performed the transition.
#[async_trait]
pub trait SessionRepository: Send + Sync + std::fmt::Debug {
    /// Insert a new active session. A token hash collision is a storage fault.
    async fn create(&self, input: &CreateSession, now: DateTime<Utc>) -> AppResult<Session>;

    /// Look up a session by token digest, revoked or not.
    async fn find_by_hash(&self, token_hash: &str) -> AppResult<Option<Session>>;

    /// Set `revoked_at = now` if it is still NULL. Returns `true` only for
    /// the call that performed the transition.
    async fn revoke(&self, token_hash: &str, now: DateTime<Utc>) -> AppResult<bool>;

    /// Revoke every active session of `user_id`. Returns how many were revoked.
    async fn revoke_all_for_user(&self, user_id: Uuid, now: DateTime<Utc>) -> AppResult<u64>;

    /// Conditionally revoke `old_hash` and insert `replacement` as one unit.
    ///
    /// Returns `None` (and inserts nothing) when `old_hash` was already
    /// revoked by someone else.
    async fn rotate(
        &self,
        old_hash: &str,
        replacement: &CreateSession,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Session>>;

    /// Active sessions of a user, newest first.
    async fn find_active_by_user(&self, user_id: Uuid, now: DateTime<Utc>)
    -> AppResult<Vec<Session>>;

    /// Delete every session past its expiry, revoked or not.
    async fn purge_expired(&self, now: DateTime<Utc>) -> AppResult<u64>;
}

/// PostgreSQL-backed session repository.
#[derive(Debug, Clone)]
pub struct PgSessionRepository {
    pool: PgPool,
}

impl PgSessionRepository {
    /// Create a new session repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const INSERT_SESSION: &str = "INSERT INTO sessions \
     (id, user_id, token_hash, user_agent, ip_address, expires_at, created_at, updated_at) \
     VALUES ($1, $2, $3, $4, $5, $6, $7, $7) RETURNING *";

fn insert_error(e: sqlx::Error) -> AppError {
    if is_unique_violation(&e) {
        AppError::with_source(ErrorKind::Storage, "Session token hash collision", e)
    } else {
        AppError::with_source(ErrorKind::Storage, "Failed to create session", e)
    }
}

#[async_trait]
impl SessionRepository for PgSessionRepository {
    async fn create(&self, input: &CreateSession, now: DateTime<Utc>) -> AppResult<Session> {
        sqlx::query_as::<_, Session>(INSERT_SESSION)
            .bind(Uuid::new_v4())
            .bind(input.user_id)
            .bind(&input.token_hash)
            .bind(&input.client.user_agent)
            .bind(&input.client.ip_address)
            .bind(input.expires_at)
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(insert_error)
    }

    async fn find_by_hash(&self, token_hash: &str) -> AppResult<Option<Session>> {
        sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE token_hash = $1")
            .bind(token_hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Storage, "Failed to find session by hash", e)
            })
    }

    async fn revoke(&self, token_hash: &str, now: DateTime<Utc>) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE sessions SET revoked_at = $2, updated_at = $2 \
             WHERE token_hash = $1 AND revoked_at IS NULL",
        )
        .bind(token_hash)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to revoke session", e))?;

        Ok(result.rows_affected() == 1)
    }

    async fn revoke_all_for_user(&self, user_id: Uuid, now: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE sessions SET revoked_at = $2, updated_at = $2 \
             WHERE user_id = $1 AND revoked_at IS NULL AND expires_at > $2",
        )
        .bind(user_id)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to revoke user sessions", e)
        })?;

        Ok(result.rows_affected())
    }

    async fn rotate(
        &self,
        old_hash: &str,
        replacement: &CreateSession,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Session>> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to begin rotation", e)
        })?;

        let revoked = sqlx::query(
            "UPDATE sessions SET revoked_at = $2, updated_at = $2 \
             WHERE token_hash = $1 AND revoked_at IS NULL",
        )
        .bind(old_hash)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to revoke session", e))?
        .rows_affected();

        if revoked != 1 {
            tx.rollback().await.map_err(|e| {
                AppError::with_source(ErrorKind::Storage, "Failed to roll back rotation", e)
            })?;
            return Ok(None);
        }

        let session = sqlx::query_as::<_, Session>(INSERT_SESSION)
            .bind(Uuid::new_v4())
            .bind(replacement.user_id)
            .bind(&replacement.token_hash)
            .bind(&replacement.client.user_agent)
            .bind(&replacement.client.ip_address)
            .bind(replacement.expires_at)
            .bind(now)
            .fetch_one(&mut *tx)
            .await
            .map_err(insert_error)?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to commit rotation", e)
        })?;

        Ok(Some(session))
    }

    async fn find_active_by_user(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<Session>> {
        sqlx::query_as::<_, Session>(
            "SELECT * FROM sessions WHERE user_id = $1 AND revoked_at IS NULL AND expires_at > $2 \
             ORDER BY created_at DESC",
        )
        .bind(user_id)
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to list sessions", e))
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at < $1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Storage, "Failed to purge expired sessions", e)
            })?;

        Ok(result.rows_affected())
    }
}
