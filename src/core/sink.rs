//! Alert sink — the only egress for detection results
//!
//! The engine enqueues `AlertEvent`s with a priority and a retry budget;
//! what happens after that (formatting, chat delivery, the backing job
//! queue) is outside the core. `ChannelSink` is the in-process
//! implementation: a bounded mpsc queue with transient-full retry.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::core::opportunity::AlertEvent;

/// Delay between retry attempts when the queue is transiently full.
const RETRY_DELAY_MS: u64 = 50;

// =============================================================================
// Errors
// =============================================================================

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SinkError {
    /// Queue still full after the retry budget was spent
    #[error("alert queue full after {0} retries")]
    Full(u32),
    /// Consumer side is gone
    #[error("alert queue closed")]
    Closed,
}

// =============================================================================
// AlertSink
// =============================================================================

/// Ordered work queue for alert delivery.
#[async_trait]
pub trait AlertSink: Send + Sync {
    /// Enqueue an event. Transient backpressure is retried up to
    /// `retries` times; terminal failure is returned to the caller.
    async fn enqueue(&self, event: AlertEvent, priority: u32, retries: u32)
        -> Result<(), SinkError>;
}

// =============================================================================
// ChannelSink
// =============================================================================

/// An alert with its delivery priority, as handed to the consumer.
#[derive(Debug, Clone)]
pub struct QueuedAlert {
    pub event: AlertEvent,
    pub priority: u32,
}

/// Bounded mpsc-backed sink. `try_send` keeps the engine's scan from
/// blocking; a full queue is retried after a short pause.
pub struct ChannelSink {
    tx: mpsc::Sender<QueuedAlert>,
}

impl ChannelSink {
    /// Create the sink plus the receiver the delivery side consumes.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<QueuedAlert>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }
}

#[async_trait]
impl AlertSink for ChannelSink {
    async fn enqueue(
        &self,
        event: AlertEvent,
        priority: u32,
        retries: u32,
    ) -> Result<(), SinkError> {
        let mut alert = QueuedAlert { event, priority };
        for attempt in 0..=retries {
            match self.tx.try_send(alert) {
                Ok(()) => return Ok(()),
                Err(mpsc::error::TrySendError::Closed(_)) => return Err(SinkError::Closed),
                Err(mpsc::error::TrySendError::Full(returned)) => {
                    alert = returned;
                    if attempt < retries {
                        tokio::time::sleep(Duration::from_millis(RETRY_DELAY_MS)).await;
                    }
                }
            }
        }
        Err(SinkError::Full(retries))
    }
}
