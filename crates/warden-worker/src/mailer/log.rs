//! Mailer that only writes messages to the log.

use async_trait::async_trait;
use tracing::{debug, info};

use warden_core::traits::{MailError, MailMessage, Mailer};

/// Logs each message instead of sending it. For development.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &MailMessage) -> Result<(), MailError> {
        info!(to = %message.to, subject = %message.subject, "Mail (log provider)");
        debug!(body = %message.text_body, "Mail body");
        Ok(())
    }
}
