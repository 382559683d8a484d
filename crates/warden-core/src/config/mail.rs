//! Outbound mail configuration.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Which mail backend delivers outbound messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MailProvider {
    /// Write messages to the log instead of sending them.
    #[default]
    Log,
    /// Deliver through the SendGrid v3 HTTP API.
    Sendgrid,
}

impl std::fmt::Display for MailProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MailProvider::Log => write!(f, "log"),
            MailProvider::Sendgrid => write!(f, "sendgrid"),
        }
    }
}

/// Outbound mail configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// Delivery backend.
    #[serde(default)]
    pub provider: MailProvider,
    /// Provider API key.
    #[serde(default)]
    pub api_key: String,
    /// Provider endpoint.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Sender address.
    #[serde(default = "default_from_email")]
    pub from_email: String,
    /// Sender display name.
    #[serde(default = "default_from_name")]
    pub from_name: String,
    /// Public base URL used to build links in messages.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Outbox capacity before hand-off starts failing.
    #[serde(default = "default_outbox_capacity")]
    pub outbox_capacity: usize,
}

impl MailConfig {
    /// Fails when the selected provider is missing its credentials.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.provider == MailProvider::Sendgrid && self.api_key.trim().is_empty() {
            return Err(AppError::configuration(
                "mail.api_key must be set when mail.provider = \"sendgrid\"",
            ));
        }
        if self.outbox_capacity == 0 {
            return Err(AppError::configuration("mail.outbox_capacity must be > 0"));
        }
        Ok(())
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            provider: MailProvider::default(),
            api_key: String::new(),
            api_url: default_api_url(),
            from_email: default_from_email(),
            from_name: default_from_name(),
            base_url: default_base_url(),
            outbox_capacity: default_outbox_capacity(),
        }
    }
}

fn default_api_url() -> String {
    "https://api.sendgrid.com/v3/mail/send".to_string()
}

fn default_from_email() -> String {
    "no-reply@localhost".to_string()
}

fn default_from_name() -> String {
    "Warden".to_string()
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_outbox_capacity() -> usize {
    256
}
