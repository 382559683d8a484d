//! Outbound mail boundary.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A rendered message ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailMessage {
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub text_body: String,
    /// HTML body.
    pub html_body: String,
}

/// Delivery failure reported by a [`Mailer`].
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    /// The provider answered but refused the message.
    #[error("mail provider rejected message ({status}): {body}")]
    Rejected {
        /// HTTP status returned by the provider.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },
    /// The provider could not be reached.
    #[error("mail transport failed: {0}")]
    Transport(String),
}

/// Something that can deliver a [`MailMessage`].
#[async_trait]
pub trait Mailer: Send + Sync + std::fmt::Debug {
    /// Delivers one message.
    async fn send(&self, message: &MailMessage) -> Result<(), MailError>;
}
