//! Message dispatcher: split, send in order, queue what fails.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::client::MessageSender;
use crate::retry_queue::RetryQueue;
use crate::split::split_message;

/// Per-message delivery outcome, counted in chunks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Delivered on the first attempt
    pub sent: usize,
    /// Handed to the retry queue
    pub queued: usize,
    /// Rejected for bad credentials; dropped
    pub rejected: usize,
}

impl DispatchReport {
    pub fn chunks(&self) -> usize {
        self.sent + self.queued + self.rejected
    }

    /// At least one chunk was delivered or is pending redelivery.
    pub fn is_accepted(&self) -> bool {
        self.sent + self.queued > 0
    }

    pub fn all_sent(&self) -> bool {
        self.queued == 0 && self.rejected == 0
    }
}

/// Sends formatted messages chunk by chunk.
pub struct Dispatcher {
    sender: Arc<dyn MessageSender>,
    queue: RetryQueue,
}

impl Dispatcher {
    pub fn new(sender: Arc<dyn MessageSender>, queue: RetryQueue) -> Self {
        Self { sender, queue }
    }

    /// Split `text` and send each chunk in order.
    ///
    /// Never fails as a whole. Auth rejections are logged and skipped,
    /// other failures go to the retry queue.
    pub async fn send_message(&self, text: &str) -> DispatchReport {
        let chunks = split_message(text);
        let total = chunks.len();
        let mut report = DispatchReport::default();

        for (index, chunk) in chunks.into_iter().enumerate() {
            match self.sender.send_text(&chunk).await {
                Ok(()) => report.sent += 1,
                Err(e) if e.is_auth_error() => {
                    error!(chunk = index + 1, total, error = %e, "Telegram API: Invalid token or chat ID");
                    report.rejected += 1;
                }
                Err(e) => {
                    warn!(chunk = index + 1, total, error = %e, "Telegram send failed. Queuing for retry...");
                    self.queue.enqueue(chunk);
                    report.queued += 1;
                }
            }
        }

        if report.all_sent() {
            info!(chunks = total, "Message sent");
        }
        report
    }

    pub fn retry_queue(&self) -> &RetryQueue {
        &self.queue
    }
}
