//! In-memory session repository.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_entity::session::{CreateSession, Session};

use crate::repositories::SessionRepository;

/// Sessions keyed by token digest.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionRepository {
    sessions: Arc<Mutex<HashMap<String, Session>>>,
}

impl MemorySessionRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rows, revoked or not.
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Whether the repository holds no rows.
    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }
}

fn insert(
    sessions: &mut HashMap<String, Session>,
    input: &CreateSession,
    now: DateTime<Utc>,
) -> AppResult<Session> {
    if sessions.contains_key(&input.token_hash) {
        return Err(AppError::storage("Session token hash collision"));
    }
    let session = Session {
        id: Uuid::new_v4(),
        user_id: input.user_id,
        token_hash: input.token_hash.clone(),
        user_agent: input.client.user_agent.clone(),
        ip_address: input.client.ip_address.clone(),
        expires_at: input.expires_at,
        revoked_at: None,
        created_at: now,
        updated_at: now,
    };
    sessions.insert(session.token_hash.clone(), session.clone());
    Ok(session)
}

fn revoke_in_place(
    sessions: &mut HashMap<String, Session>,
    token_hash: &str,
    now: DateTime<Utc>,
) -> bool {
    match sessions.get_mut(token_hash) {
        Some(session) if session.revoked_at.is_none() => {
            session.revoked_at = Some(now);
            session.updated_at = now;
            true
        }
        _ => false,
    }
}

#[async_trait]
impl SessionRepository for MemorySessionRepository {
    async fn create(&self, input: &CreateSession, now: DateTime<Utc>) -> AppResult<Session> {
        let mut sessions = self.sessions.lock().await;
        insert(&mut sessions, input, now)
    }

    async fn find_by_hash(&self, token_hash: &str) -> AppResult<Option<Session>> {
        Ok(self.sessions.lock().await.get(token_hash).cloned())
    }

    async fn revoke(&self, token_hash: &str, now: DateTime<Utc>) -> AppResult<bool> {
        let mut sessions = self.sessions.lock().await;
        Ok(revoke_in_place(&mut sessions, token_hash, now))
    }

    async fn revoke_all_for_user(&self, user_id: Uuid, now: DateTime<Utc>) -> AppResult<u64> {
        let mut sessions = self.sessions.lock().await;
        let mut count = 0;
        for session in sessions.values_mut() {
            if session.user_id == user_id && session.is_active(now) {
                session.revoked_at = Some(now);
                session.updated_at = now;
                count += 1;
            }
        }
        Ok(count)
    }

    async fn rotate(
        &self,
        old_hash: &str,
        replacement: &CreateSession,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Session>> {
        let mut sessions = self.sessions.lock().await;
        if sessions.contains_key(&replacement.token_hash) {
            return Err(AppError::storage("Session token hash collision"));
        }
        if !revoke_in_place(&mut sessions, old_hash, now) {
            return Ok(None);
        }
        insert(&mut sessions, replacement, now).map(Some)
    }

    async fn find_active_by_user(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<Session>> {
        let sessions = self.sessions.lock().await;
        let mut active: Vec<Session> = sessions
            .values()
            .filter(|s| s.user_id == user_id && s.is_active(now))
            .cloned()
            .collect();
        active.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(active)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.expires_at >= now);
        Ok((before - sessions.len()) as u64)
    }
}
