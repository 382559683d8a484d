//! Session lifecycle: bounded store access, rotation, and the
//! login/refresh/logout surface.

pub mod cleanup;
pub mod manager;
pub mod rotation;
pub mod store;

pub use cleanup::SessionCleanup;
pub use manager::SessionManager;
pub use rotation::{IssuedSession, RotationProtocol, TokenState};
pub use store::SessionStore;
