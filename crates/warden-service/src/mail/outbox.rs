//! Non-blocking hand-off of outbound mail to the delivery worker.

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_core::traits::MailMessage;

/// Sending half of the mail queue. Cloned into every service that sends
/// mail; the receiving half belongs to the delivery worker.
#[derive(Debug, Clone)]
pub struct MailOutbox {
    sender: mpsc::Sender<MailMessage>,
}

impl MailOutbox {
    /// Creates a bounded outbox and the receiver the worker drains.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<MailMessage>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }

    /// Queues a message without waiting. Fails when the queue is full or
    /// the worker has gone away; delivery itself is never awaited.
    pub fn hand_off(&self, message: MailMessage) -> AppResult<()> {
        self.sender.try_send(message).map_err(|e| match e {
            TrySendError::Full(_) => AppError::mail("Mail outbox is full"),
            TrySendError::Closed(_) => AppError::mail("Mail outbox is closed"),
        })
    }
}
