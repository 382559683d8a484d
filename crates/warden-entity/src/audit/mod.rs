//! Security audit entities.

pub mod model;

pub use model::{CreateSecurityAuditRecord, SecurityAuditRecord, SecurityEvent};
