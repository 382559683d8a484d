//! Session persistence with a bounded call time.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use warden_core::config::SessionConfig;
use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_database::repositories::SessionRepository;
use warden_entity::session::{CreateSession, Session};

/// Session repository access where every call must finish within the
/// configured store timeout. A call that runs over is reported as a
/// storage error, never as a silent pass.
#[derive(Debug, Clone)]
pub struct SessionStore {
    repo: Arc<dyn SessionRepository>,
    timeout: Duration,
}

impl SessionStore {
    /// Creates a new session store.
    pub fn new(repo: Arc<dyn SessionRepository>, config: &SessionConfig) -> Self {
        Self {
            repo,
            timeout: Duration::from_millis(config.store_timeout_ms),
        }
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = AppResult<T>>,
    ) -> AppResult<T> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    operation,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Session store call timed out"
                );
                Err(AppError::storage(format!(
                    "Session store {operation} timed out"
                )))
            }
        }
    }

    /// Inserts a new active session.
    pub async fn create(&self, input: &CreateSession, now: DateTime<Utc>) -> AppResult<Session> {
        self.bounded("create", self.repo.create(input, now)).await
    }

    /// Finds a session by digest, including revoked sessions.
    pub async fn find_by_hash(&self, token_hash: &str) -> AppResult<Option<Session>> {
        self.bounded("find_by_hash", self.repo.find_by_hash(token_hash))
            .await
    }

    /// Conditionally revokes one session. `true` if this call revoked it.
    pub async fn revoke(&self, token_hash: &str, now: DateTime<Utc>) -> AppResult<bool> {
        self.bounded("revoke", self.repo.revoke(token_hash, now))
            .await
    }

    /// Revokes every active session of a user.
    pub async fn revoke_all_for_user(&self, user_id: Uuid, now: DateTime<Utc>) -> AppResult<u64> {
        self.bounded(
            "revoke_all_for_user",
            self.repo.revoke_all_for_user(user_id, now),
        )
        .await
    }

    /// Conditionally revokes `old_hash` and inserts `replacement` atomically.
    ///
    /// If the timeout fires mid-call the in-flight transaction is dropped
    /// and rolled back, so either both writes happen or neither does.
    pub async fn rotate(
        &self,
        old_hash: &str,
        replacement: &CreateSession,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Session>> {
        self.bounded("rotate", self.repo.rotate(old_hash, replacement, now))
            .await
    }

    /// Active sessions of a user.
    pub async fn find_active_by_user(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<Session>> {
        self.bounded(
            "find_active_by_user",
            self.repo.find_active_by_user(user_id, now),
        )
        .await
    }

    /// Deletes expired sessions.
    pub async fn purge_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        self.bounded("purge_expired", self.repo.purge_expired(now))
            .await
    }
}
