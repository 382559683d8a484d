//! Mail delivery worker: drains the outbox and hands each message to the
//! configured [`Mailer`].

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{error, info};

use warden_core::traits::{MailMessage, Mailer};

/// Delivers queued mail one message at a time. Failures are logged and
/// the message is dropped; there is no retry.
#[derive(Debug, Clone)]
pub struct MailDeliveryWorker {
    /// Delivery backend.
    mailer: Arc<dyn Mailer>,
}

impl MailDeliveryWorker {
    /// Create a new delivery worker.
    pub fn new(mailer: Arc<dyn Mailer>) -> Self {
        Self { mailer }
    }

    /// Runs until the outbox closes or the cancel signal is received.
    /// Messages already queued at cancellation are still delivered.
    pub async fn run(
        &self,
        mut inbox: mpsc::Receiver<MailMessage>,
        mut cancel: watch::Receiver<bool>,
    ) {
        info!(mailer = ?self.mailer, "Mail delivery worker started");

        loop {
            tokio::select! {
                changed = cancel.changed() => {
                    if changed.is_err() || *cancel.borrow() {
                        info!("Mail delivery worker received shutdown signal");
                        break;
                    }
                }
                message = inbox.recv() => match message {
                    Some(message) => {
                        self.deliver(&message).await;
                    }
                    None => {
                        info!("Mail outbox closed, delivery worker stopping");
                        return;
                    }
                },
            }
        }

        while let Ok(message) = inbox.try_recv() {
            self.deliver(&message).await;
        }
        info!("Mail delivery worker stopped");
    }

    /// Delivers one message. Returns whether the mailer accepted it.
    pub async fn deliver(&self, message: &MailMessage) -> bool {
        match self.mailer.send(message).await {
            Ok(()) => {
                info!(to = %message.to, subject = %message.subject, "Mail delivered");
                true
            }
            Err(e) => {
                error!(
                    to = %message.to,
                    subject = %message.subject,
                    error = %e,
                    "Failed to deliver mail"
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    use warden_core::traits::MailError;

    use super::*;

    #[derive(Debug, Default)]
    struct FlakyMailer {
        delivered: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Mailer for FlakyMailer {
        async fn send(&self, message: &MailMessage) -> Result<(), MailError> {
            if message.to.starts_with("bounce") {
                return Err(MailError::Rejected {
                    status: 400,
                    body: "bad recipient".to_string(),
                });
            }
            self.delivered.lock().await.push(message.to.clone());
            Ok(())
        }
    }

    fn message(to: &str) -> MailMessage {
        MailMessage {
            to: to.to_string(),
            subject: "Invitation".to_string(),
            text_body: "hello".to_string(),
            html_body: "<p>hello</p>".to_string(),
        }
    }

    #[tokio::test]
    async fn failures_do_not_stop_the_worker() {
        let mailer = Arc::new(FlakyMailer::default());
        let worker = MailDeliveryWorker::new(mailer.clone());
        let (tx, rx) = mpsc::channel(8);
        let (_cancel_tx, cancel_rx) = watch::channel(false);

        tx.send(message("a@example.com")).await.unwrap();
        tx.send(message("bounce@example.com")).await.unwrap();
        tx.send(message("b@example.com")).await.unwrap();
        drop(tx);

        worker.run(rx, cancel_rx).await;

        assert_eq!(
            *mailer.delivered.lock().await,
            vec!["a@example.com".to_string(), "b@example.com".to_string()]
        );
    }

    #[tokio::test]
    async fn cancellation_drains_queued_mail() {
        let mailer = Arc::new(FlakyMailer::default());
        let worker = MailDeliveryWorker::new(mailer.clone());
        let (tx, rx) = mpsc::channel(8);
        let (cancel_tx, cancel_rx) = watch::channel(false);

        tx.send(message("c@example.com")).await.unwrap();
        cancel_tx.send(true).unwrap();

        worker.run(rx, cancel_rx).await;

        assert_eq!(*mailer.delivered.lock().await, vec!["c@example.com".to_string()]);
        drop(tx);
    }
}
