//! Outbound mail: message templates and the hand-off queue.

pub mod outbox;
pub mod template;

pub use outbox::MailOutbox;
pub use template::invitation_email;
