//! Message and thread lookups needed to route a delivery failure.
//!
//! Only the two queries the dispatch core needs are modelled; the rest of
//! message storage belongs to the host application.

pub mod sqlite;

use async_trait::async_trait;

use crate::address::Recipient;

pub use self::sqlite::SqliteStore;

/// Errors from message or thread lookups.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// No message with this id.
    #[error("message not found: {0}")]
    MessageNotFound(i64),
}

/// Looks up which thread a message belongs to.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Thread id owning `message_id`.
    async fn thread_id_for(&self, message_id: i64) -> Result<i64, StoreError>;
}

/// Looks up the participants of a thread.
#[async_trait]
pub trait ThreadStore: Send + Sync {
    /// Recipients of `thread_id`, ordered by recipient id.
    async fn recipients_for(&self, thread_id: i64) -> Result<Vec<Recipient>, StoreError>;
}
