//! Notification delivery: sink trait, logging sink and the queue worker.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::{Duration, sleep};

use super::models::{MatchCreated, NotifierConfig};

/// Notification delivery errors
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("publish failed: {0}")]
    Publish(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Transport boundary for notification delivery. The production sink talks
/// to a message broker; tests and development use [`LogSink`].
#[async_trait]
pub trait NotificationSink: Send + Sync + 'static {
    async fn publish(&self, event: &MatchCreated) -> Result<(), NotifyError>;
}

/// Sink that only writes the payload to the log.
pub struct LogSink {
    config: NotifierConfig,
}

impl LogSink {
    pub fn new(config: NotifierConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl NotificationSink for LogSink {
    async fn publish(&self, event: &MatchCreated) -> Result<(), NotifyError> {
        let body = serde_json::to_string(event)?;
        log::info!(
            "publish {}/{}: {}",
            self.config.exchange,
            self.config.routing_key,
            body
        );
        Ok(())
    }
}

/// Handle for queueing match-created events.
///
/// Cloning is cheap; dropping every handle closes the queue and ends the
/// worker once it drains.
#[derive(Clone)]
pub struct MatchNotifier {
    sender: mpsc::Sender<MatchCreated>,
}

impl MatchNotifier {
    /// Spawn the delivery worker and return its handle.
    pub fn spawn<S: NotificationSink>(config: NotifierConfig, sink: S) -> Self {
        let (sender, inbox) = mpsc::channel(config.queue_capacity);
        tokio::spawn(deliver(config, Arc::new(sink), inbox));
        Self { sender }
    }

    /// Queue an event. Never blocks and never fails the caller: when the
    /// queue is full or closed the event is dropped with a warning.
    pub fn notify(&self, event: MatchCreated) {
        if let Err(e) = self.sender.try_send(event) {
            log::warn!("dropping match-created notification: {e}");
        }
    }

    /// Queue one event per created match.
    pub fn notify_all<'a, I>(&self, matches: I)
    where
        I: IntoIterator<Item = &'a crate::competition::Match>,
    {
        for m in matches {
            self.notify(MatchCreated::from(m));
        }
    }
}

async fn deliver(
    config: NotifierConfig,
    sink: Arc<dyn NotificationSink>,
    mut inbox: mpsc::Receiver<MatchCreated>,
) {
    while let Some(event) = inbox.recv().await {
        let mut delivered = false;
        for attempt in 1..=config.max_attempts {
            match sink.publish(&event).await {
                Ok(()) => {
                    delivered = true;
                    break;
                }
                Err(e) => {
                    log::warn!(
                        "notification attempt {attempt}/{} for match {} failed: {e}",
                        config.max_attempts,
                        event.match_id
                    );
                    if attempt < config.max_attempts {
                        sleep(Duration::from_millis(config.retry_delay_ms)).await;
                    }
                }
            }
        }
        if !delivered {
            log::error!(
                "giving up on match-created notification for match {}",
                event.match_id
            );
        }
    }
}
