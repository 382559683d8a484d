//! Repository traits and their PostgreSQL implementations.

pub mod audit;
pub mod invitation;
pub mod session;
pub mod user;

use std::sync::Arc;

use sqlx::PgPool;

pub use audit::{AuditRepository, PgAuditRepository};
pub use invitation::{InvitationRepository, PgInvitationRepository};
pub use session::{PgSessionRepository, SessionRepository};
pub use user::{PgUserRepository, UserRepository};

use crate::memory::{
    MemoryAuditRepository, MemoryInvitationRepository, MemorySessionRepository,
    MemoryUserRepository,
};

/// The full set of repositories, behind trait objects.
#[derive(Debug, Clone)]
pub struct Repositories {
    /// Refresh-token sessions.
    pub sessions: Arc<dyn SessionRepository>,
    /// Invitations.
    pub invitations: Arc<dyn InvitationRepository>,
    /// Accounts.
    pub users: Arc<dyn UserRepository>,
    /// Security audit log.
    pub audit: Arc<dyn AuditRepository>,
}

impl Repositories {
    /// Repositories backed by PostgreSQL.
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            sessions: Arc::new(PgSessionRepository::new(pool.clone())),
            invitations: Arc::new(PgInvitationRepository::new(pool.clone())),
            users: Arc::new(PgUserRepository::new(pool.clone())),
            audit: Arc::new(PgAuditRepository::new(pool)),
        }
    }

    /// Repositories held in process memory.
    pub fn memory() -> Self {
        Self {
            sessions: Arc::new(MemorySessionRepository::new()),
            invitations: Arc::new(MemoryInvitationRepository::new()),
            users: Arc::new(MemoryUserRepository::new()),
            audit: Arc::new(MemoryAuditRepository::new()),
        }
    }
}

/// Whether a sqlx error is a unique-constraint violation.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false)
}
