//! Invitation domain entities.

pub mod model;
pub mod status;

pub use model::{CreateInvitation, Invitation};
pub use status::InvitationStatus;
