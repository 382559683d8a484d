//! # warden-database
//!
//! Persistence for sessions, invitations, users, and the security audit
//! log. Each repository is an async trait with a PostgreSQL implementation
//! (sqlx) and an in-process implementation used by tests and by
//! `database.url = "memory"`.
//!
//! Every mutation the session and invitation protocols rely on is a
//! conditional write: revoke-if-not-revoked, rotate in one transaction,
//! accept-if-pending. Callers never read-modify-write.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;

pub use connection::{DatabasePool, open_repositories};
pub use repositories::Repositories;
