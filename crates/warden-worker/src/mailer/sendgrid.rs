//! SendGrid v3 mail delivery.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use warden_core::config::MailConfig;
use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_core::traits::{MailError, MailMessage, Mailer};

/// HTTP request timeout for a single delivery.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize)]
struct Address<'a> {
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct Personalization<'a> {
    to: [Address<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    value: &'a str,
}

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    personalizations: [Personalization<'a>; 1],
    from: Address<'a>,
    subject: &'a str,
    content: [Content<'a>; 2],
}

/// Sends mail through the SendGrid v3 `mail/send` endpoint.
#[derive(Clone)]
pub struct SendGridMailer {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    from_email: String,
    from_name: String,
}

impl std::fmt::Debug for SendGridMailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SendGridMailer")
            .field("api_url", &self.api_url)
            .field("from_email", &self.from_email)
            .finish()
    }
}

impl SendGridMailer {
    /// Creates a mailer from the mail configuration.
    pub fn new(config: &MailConfig) -> AppResult<Self> {
        if config.api_key.trim().is_empty() {
            return Err(AppError::configuration("mail.api_key is required for sendgrid"));
        }
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            from_email: config.from_email.clone(),
            from_name: config.from_name.clone(),
        })
    }

    fn request_body<'a>(&'a self, message: &'a MailMessage) -> SendRequest<'a> {
        SendRequest {
            personalizations: [Personalization {
                to: [Address {
                    email: &message.to,
                    name: None,
                }],
            }],
            from: Address {
                email: &self.from_email,
                name: Some(&self.from_name),
            },
            subject: &message.subject,
            content: [
                Content {
                    kind: "text/plain",
                    value: &message.text_body,
                },
                Content {
                    kind: "text/html",
                    value: &message.html_body,
                },
            ],
        }
    }
}

#[async_trait]
impl Mailer for SendGridMailer {
    async fn send(&self, message: &MailMessage) -> Result<(), MailError> {
        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(message))
            .send()
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}
