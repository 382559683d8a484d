//! In-memory repository implementations.
//!
//! Each repository keeps its rows behind a Tokio mutex, so every
//! conditional write runs under one lock and is atomic with respect to
//! other callers. Suitable for tests and single-node development only.

pub mod audit;
pub mod invitation;
pub mod session;
pub mod user;

pub use audit::MemoryAuditRepository;
pub use invitation::MemoryInvitationRepository;
pub use session::MemorySessionRepository;
pub use user::MemoryUserRepository;
