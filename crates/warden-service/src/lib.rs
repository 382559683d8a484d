//! # warden-service
//!
//! Business logic for Warden beyond the session protocol: the invitation
//! lifecycle, invitation-gated registration, and the outbox that hands
//! outbound mail to the delivery worker.
//!
//! Services follow constructor injection; all dependencies are provided
//! at construction time via `Arc` references.

pub mod account;
pub mod invitation;
pub mod mail;

pub use account::{AccountService, NewAccount};
pub use invitation::InvitationService;
pub use mail::{MailOutbox, invitation_email};
