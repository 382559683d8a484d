//! Background work for Warden.
//!
//! This crate provides:
//! - Mailer implementations (log-only and SendGrid)
//! - A delivery worker that drains the mail outbox
//! - A cron scheduler for the expired-session purge

pub mod delivery;
pub mod mailer;
pub mod scheduler;

pub use delivery::MailDeliveryWorker;
pub use mailer::{LogMailer, SendGridMailer, build_mailer};
pub use scheduler::CronScheduler;
