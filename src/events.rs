//! Transfer progress events and the broadcast bus that carries them.
//!
//! Publishing never blocks and never fails: with no subscribers the event
//! is dropped, and slow subscribers lag rather than stall the transfer.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::broadcast;

/// Point-in-time snapshot of an attachment upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TransferProgressEvent {
    /// Local id of the message the attachment belongs to.
    pub message_id: i64,
    /// Declared total bytes.
    pub total: u64,
    /// Bytes transferred so far.
    pub current: u64,
}

/// Callback invoked by an uploader with `(current, total)` byte counts.
pub type ProgressListener = Arc<dyn Fn(u64, u64) + Send + Sync>;

/// Receiving half of the progress bus.
pub type ProgressReceiver = broadcast::Receiver<TransferProgressEvent>;

/// Fan-out channel for [`TransferProgressEvent`]s.
#[derive(Debug, Clone)]
pub struct ProgressBus {
    tx: broadcast::Sender<TransferProgressEvent>,
}

impl ProgressBus {
    /// Create a bus buffering up to `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Subscribe to future events.
    pub fn subscribe(&self) -> ProgressReceiver {
        self.tx.subscribe()
    }

    /// Publish an event; dropped when nobody listens.
    pub fn publish(&self, event: TransferProgressEvent) {
        let _ = self.tx.send(event);
    }

    /// A listener that publishes progress for `message_id`.
    pub fn listener_for(&self, message_id: i64) -> ProgressListener {
        let bus = self.clone();
        Arc::new(move |current, total| {
            bus.publish(TransferProgressEvent {
                message_id,
                total,
                current,
            });
        })
    }
}
