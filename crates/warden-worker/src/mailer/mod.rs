//! [`Mailer`] implementations and provider selection.

pub mod log;
pub mod sendgrid;

use std::sync::Arc;

use warden_core::config::{MailConfig, MailProvider};
use warden_core::result::AppResult;
use warden_core::traits::Mailer;

pub use self::log::LogMailer;
pub use self::sendgrid::SendGridMailer;

/// Builds the mailer selected by `mail.provider`.
pub fn build_mailer(config: &MailConfig) -> AppResult<Arc<dyn Mailer>> {
    match config.provider {
        MailProvider::Log => Ok(Arc::new(LogMailer)),
        MailProvider::Sendgrid => Ok(Arc::new(SendGridMailer::new(config)?)),
    }
}
