//! Core traits shared across Warden crates.

pub mod clock;
pub mod mailer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use mailer::{MailError, MailMessage, Mailer};
