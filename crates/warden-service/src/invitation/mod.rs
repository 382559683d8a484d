//! Invitation lifecycle: issue, resend on expiry, accept, and the
//! registration gate.

pub mod service;

pub use service::InvitationService;
