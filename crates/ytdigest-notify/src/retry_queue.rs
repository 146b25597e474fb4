//! In-memory retry queue for chunks that failed to send.
//!
//! A single background drain task empties the queue in FIFO order. The
//! `draining` flag lives under the same mutex as the items, so an enqueue
//! racing with the end of a drain either lands before the drain observes
//! an empty queue or starts a new drain itself.
//!
//! Items are retried until they succeed or the process exits. There is no
//! attempt cap: a channel that never recovers keeps the queue spinning and
//! delays everything behind the failing item.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::Notify;
use tracing::{debug, info, warn};

use crate::client::MessageSender;

/// Retry queue timing.
#[derive(Debug, Clone)]
pub struct RetryQueueConfig {
    /// Wait before each attempt, and again after a failed one
    pub delay: Duration,
}

impl Default for RetryQueueConfig {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(30),
        }
    }
}

impl RetryQueueConfig {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[derive(Debug, Default)]
struct QueueState {
    items: VecDeque<String>,
    draining: bool,
}

struct Inner {
    state: Mutex<QueueState>,
    sender: Arc<dyn MessageSender>,
    config: RetryQueueConfig,
    idle: Notify,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, QueueState> {
        // The lock is never held across an await or a panic point.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Owned FIFO retry queue. Cloning shares the same queue.
#[derive(Clone)]
pub struct RetryQueue {
    inner: Arc<Inner>,
}

impl RetryQueue {
    pub fn new(sender: Arc<dyn MessageSender>, config: RetryQueueConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(QueueState::default()),
                sender,
                config,
                idle: Notify::new(),
            }),
        }
    }

    /// Append a chunk to the tail and make sure a drain is running.
    pub fn enqueue(&self, text: impl Into<String>) {
        let len = {
            let mut state = self.inner.lock();
            state.items.push_back(text.into());
            state.items.len()
        };
        debug!(queued = len, "Chunk queued for retry");
        self.kick();
    }

    /// Start the drain task unless one is already running or there is
    /// nothing to do. Must be called from within a Tokio runtime.
    pub fn kick(&self) {
        {
            let mut state = self.inner.lock();
            if state.draining || state.items.is_empty() {
                return;
            }
            state.draining = true;
        }

        let inner = Arc::clone(&self.inner);
        tokio::spawn(drain(inner));
    }

    /// Number of chunks waiting.
    pub fn len(&self) -> usize {
        self.inner.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_draining(&self) -> bool {
        self.inner.lock().draining
    }

    fn is_idle(&self) -> bool {
        let state = self.inner.lock();
        !state.draining && state.items.is_empty()
    }

    /// Wait until the queue is empty and no drain is running.
    ///
    /// Returns `false` if `timeout` elapsed first.
    pub async fn wait_idle(&self, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let notified = self.inner.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.is_idle() {
                return true;
            }
            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return self.is_idle();
            }
        }
    }
}

async fn drain(inner: Arc<Inner>) {
    let delay = inner.config.delay;
    info!("Processing retry queue");

    loop {
        let item = {
            let mut state = inner.lock();
            match state.items.pop_front() {
                Some(item) => item,
                None => {
                    state.draining = false;
                    drop(state);
                    inner.idle.notify_waiters();
                    debug!("Retry queue drained");
                    return;
                }
            }
        };

        tokio::time::sleep(delay).await;

        match inner.sender.send_text(&item).await {
            Ok(()) => info!("Queued Telegram message delivered"),
            Err(e) => {
                warn!(error = %e, "Telegram retry failed. Will try again later.");
                inner.lock().items.push_back(item);
                tokio::time::sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{NotifyError, NotifyResult};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fails the first `failures` attempts, then records every text sent.
    struct FlakySender {
        failures: AtomicUsize,
        attempts: AtomicUsize,
        sent: Mutex<Vec<String>>,
    }

    impl FlakySender {
        fn new(failures: usize) -> Arc<Self> {
            Arc::new(Self {
                failures: AtomicUsize::new(failures),
                attempts: AtomicUsize::new(0),
                sent: Mutex::new(Vec::new()),
            })
        }

        fn sent(&self) -> Vec<String> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MessageSender for FlakySender {
        async fn send_text(&self, text: &str) -> NotifyResult<()> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            let remaining = self.failures.load(Ordering::SeqCst);
            if remaining > 0 {
                self.failures.store(remaining - 1, Ordering::SeqCst);
                return Err(NotifyError::from_http_status(502, "Bad Gateway"));
            }
            self.sent.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    fn queue_with(sender: Arc<FlakySender>) -> RetryQueue {
        RetryQueue::new(sender, RetryQueueConfig::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_drains_in_fifo_order() {
        let sender = FlakySender::new(0);
        let queue = queue_with(sender.clone());

        queue.enqueue("first");
        queue.enqueue("second");
        queue.enqueue("third");

        assert!(queue.wait_idle(Duration::from_secs(600)).await);
        assert_eq!(sender.sent(), vec!["first", "second", "third"]);
        assert!(queue.is_empty());
        assert!(!queue.is_draining());
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_fixed_delay_before_each_attempt() {
        let sender = FlakySender::new(0);
        let queue = queue_with(sender.clone());
        let start = tokio::time::Instant::now();

        queue.enqueue("only");
        assert!(queue.wait_idle(Duration::from_secs(600)).await);

        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(30) && elapsed < Duration::from_secs(31));
        assert_eq!(sender.attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_item_goes_to_tail_and_is_retried() {
        let sender = FlakySender::new(1);
        let queue = queue_with(sender.clone());

        queue.enqueue("a");
        queue.enqueue("b");

        assert!(queue.wait_idle(Duration::from_secs(600)).await);
        // "a" failed once and was re-queued behind "b".
        assert_eq!(sender.sent(), vec!["b", "a"]);
        assert_eq!(sender.attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_until_success() {
        let sender = FlakySender::new(5);
        let queue = queue_with(sender.clone());
        let start = tokio::time::Instant::now();

        queue.enqueue("stubborn");
        assert!(queue.wait_idle(Duration::from_secs(3600)).await);

        assert_eq!(sender.sent(), vec!["stubborn"]);
        assert_eq!(sender.attempts.load(Ordering::SeqCst), 6);
        // Five failures cost two delays each, the final success one.
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(30 * 11) && elapsed < Duration::from_secs(30 * 11 + 1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_idle_times_out_while_failing() {
        let sender = FlakySender::new(usize::MAX);
        let queue = queue_with(sender.clone());

        queue.enqueue("never");

        assert!(!queue.wait_idle(Duration::from_secs(100)).await);
        assert!(queue.is_draining());
        assert!(sender.sent().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_kick_is_noop_on_empty_queue() {
        let queue = queue_with(FlakySender::new(0));

        queue.kick();

        assert!(!queue.is_draining());
        assert!(queue.wait_idle(Duration::from_secs(1)).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_drain_while_running() {
        let sender = FlakySender::new(0);
        let queue = queue_with(sender.clone());

        queue.enqueue("one");
        assert!(queue.is_draining());
        queue.kick();
        queue.enqueue("two");

        assert!(queue.wait_idle(Duration::from_secs(600)).await);
        assert_eq!(sender.sent(), vec!["one", "two"]);
        assert_eq!(sender.attempts.load(Ordering::SeqCst), 2);
    }
}
