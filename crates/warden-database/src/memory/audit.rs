//! In-memory security audit repository.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use warden_core::result::AppResult;
use warden_entity::audit::{CreateSecurityAuditRecord, SecurityAuditRecord};

use crate::repositories::AuditRepository;

/// Append-only record list.
#[derive(Debug, Clone, Default)]
pub struct MemoryAuditRepository {
    records: Arc<Mutex<Vec<SecurityAuditRecord>>>,
}

impl MemoryAuditRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuditRepository for MemoryAuditRepository {
    async fn record(
        &self,
        input: &CreateSecurityAuditRecord,
        now: DateTime<Utc>,
    ) -> AppResult<SecurityAuditRecord> {
        let record = SecurityAuditRecord {
            id: Uuid::new_v4(),
            user_id: input.user_id,
            event: input.event.as_str().to_string(),
            user_agent: input.user_agent.clone(),
            ip_address: input.ip_address.clone(),
            presented_user_agent: input.presented_user_agent.clone(),
            presented_ip_address: input.presented_ip_address.clone(),
            original_revoked_at: input.original_revoked_at,
            sessions_revoked: input.sessions_revoked,
            created_at: now,
        };
        self.records.lock().await.push(record.clone());
        Ok(record)
    }

    async fn find_by_user(&self, user_id: Uuid) -> AppResult<Vec<SecurityAuditRecord>> {
        let records = self.records.lock().await;
        Ok(records
            .iter()
            .rev()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }
}
