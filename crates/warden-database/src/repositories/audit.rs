//! Security audit log repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use warden_core::error::{AppError, ErrorKind};
use warden_core::result::AppResult;
use warden_entity::audit::{CreateSecurityAuditRecord, SecurityAuditRecord};

/// Append-only store of security events.
#[async_trait]
pub trait AuditRepository: Send + Sync + std::fmt::Debug {
    /// Append a record.
    async fn record(
        &self,
        input: &CreateSecurityAuditRecord,
        now: DateTime<Utc>,
    ) -> AppResult<SecurityAuditRecord>;

    /// Records for one user, newest first.
    async fn find_by_user(&self, user_id: Uuid) -> AppResult<Vec<SecurityAuditRecord>>;
}

/// PostgreSQL-backed audit repository.
#[derive(Debug, Clone)]
pub struct PgAuditRepository {
    pool: PgPool,
}

impl PgAuditRepository {
    /// Create a new audit repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditRepository for PgAuditRepository {
    async fn record(
        &self,
        input: &CreateSecurityAuditRecord,
        now: DateTime<Utc>,
    ) -> AppResult<SecurityAuditRecord> {
        sqlx::query_as::<_, SecurityAuditRecord>(
            "INSERT INTO security_audit_log \
             (id, user_id, event, user_agent, ip_address, presented_user_agent, \
              presented_ip_address, original_revoked_at, sessions_revoked, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(input.user_id)
        .bind(input.event.as_str())
        .bind(&input.user_agent)
        .bind(&input.ip_address)
        .bind(&input.presented_user_agent)
        .bind(&input.presented_ip_address)
        .bind(input.original_revoked_at)
        .bind(input.sessions_revoked)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to write audit record", e))
    }

    async fn find_by_user(&self, user_id: Uuid) -> AppResult<Vec<SecurityAuditRecord>> {
        sqlx::query_as::<_, SecurityAuditRecord>(
            "SELECT * FROM security_audit_log WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to list audit records", e))
    }
}
