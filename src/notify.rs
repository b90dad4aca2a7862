//! Best-effort delivery-failure notification.
//!
//! When a send exhausts its retries, the owning thread and its recipients
//! are looked up and a user-visible signal is raised. Nothing here is
//! retried and no error escapes: a failed lookup is only logged.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::warn;

use crate::address::Recipient;
use crate::store::{MessageStore, StoreError, ThreadStore};

/// Errors raised while routing a delivery-failure notification.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// Message or thread lookup failed.
    #[error("lookup failed: {0}")]
    Store(#[from] StoreError),

    /// The notification sink rejected the signal.
    #[error("notification not delivered: {0}")]
    Sink(String),
}

/// A delivery-failed signal for the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryFailure {
    /// Thread the failed message belongs to.
    pub thread_id: i64,
    /// Recipients of that thread.
    pub recipients: Vec<Recipient>,
}

/// Raises user-visible notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Signal that a message in `thread_id` could not be delivered.
    async fn delivery_failed(
        &self,
        recipients: &[Recipient],
        thread_id: i64,
    ) -> Result<(), NotifyError>;
}

/// Writes delivery failures to the log.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn delivery_failed(
        &self,
        recipients: &[Recipient],
        thread_id: i64,
    ) -> Result<(), NotifyError> {
        warn!(thread_id, recipients = recipients.len(), "message delivery failed");
        Ok(())
    }
}

/// Forwards delivery failures to a UI task over an mpsc channel.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::Sender<DeliveryFailure>,
}

impl ChannelNotifier {
    /// Create a notifier sending into `tx`.
    pub fn new(tx: mpsc::Sender<DeliveryFailure>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl Notifier for ChannelNotifier {
    async fn delivery_failed(
        &self,
        recipients: &[Recipient],
        thread_id: i64,
    ) -> Result<(), NotifyError> {
        self.tx
            .send(DeliveryFailure {
                thread_id,
                recipients: recipients.to_vec(),
            })
            .await
            .map_err(|e| NotifyError::Sink(e.to_string()))
    }
}

/// Routes a failed message to its thread's recipients and notifies.
#[derive(Clone)]
pub struct DeliveryFailureNotifier {
    messages: Arc<dyn MessageStore>,
    threads: Arc<dyn ThreadStore>,
    notifier: Arc<dyn Notifier>,
}

impl DeliveryFailureNotifier {
    /// Create a notifier over the given stores and sink.
    pub fn new(
        messages: Arc<dyn MessageStore>,
        threads: Arc<dyn ThreadStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            messages,
            threads,
            notifier,
        }
    }

    /// Notify that `message_id` failed delivery. Failures are logged only.
    pub async fn notify_delivery_failed(&self, message_id: i64) {
        if let Err(e) = self.try_notify(message_id).await {
            warn!(message_id, error = %e, "delivery failure notification dropped");
        }
    }

    async fn try_notify(&self, message_id: i64) -> Result<(), NotifyError> {
        let thread_id = self.messages.thread_id_for(message_id).await?;
        let recipients = self.threads.recipients_for(thread_id).await?;
        self.notifier.delivery_failed(&recipients, thread_id).await
    }
}
