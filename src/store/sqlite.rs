//! SQLite-backed [`MessageStore`] and [`ThreadStore`].

use std::path::Path;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::{info, trace};

use super::{MessageStore, StoreError, ThreadStore};
use crate::address::Recipient;

const SCHEMA: &str = include_str!("../../migrations/001_schema.sql");

/// Message and thread tables in a SQLite database.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `path` and apply the schema.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the database cannot be opened or
    /// the schema cannot be applied.
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        let opts = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(opts).await?;
        info!(path = %path.display(), "message store opened");
        Self::with_pool(pool).await
    }

    /// Open a private in-memory database.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the schema cannot be applied.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let opts = SqliteConnectOptions::new()
            .filename(":memory:")
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(opts)
            .await?;
        Self::with_pool(pool).await
    }

    /// Wrap an existing pool, applying the schema.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the schema cannot be applied.
    pub async fn with_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        sqlx::raw_sql(SCHEMA).execute(&pool).await?;
        Ok(Self { pool })
    }

    /// Create a thread with the given recipient numbers and return its id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] on SQLite failure.
    pub async fn create_thread(&self, numbers: &[&str]) -> Result<i64, StoreError> {
        let mut tx = self.pool.begin().await?;
        let thread_id = sqlx::query("INSERT INTO threads DEFAULT VALUES")
            .execute(&mut *tx)
            .await?
            .last_insert_rowid();
        for number in numbers {
            sqlx::query("INSERT OR IGNORE INTO recipients (number) VALUES (?1)")
                .bind(*number)
                .execute(&mut *tx)
                .await?;
            sqlx::query(
                "INSERT OR IGNORE INTO thread_recipients (thread_id, recipient_id) \
                 SELECT ?1, id FROM recipients WHERE number = ?2",
            )
            .bind(thread_id)
            .bind(*number)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        trace!(thread_id, recipients = numbers.len(), "thread created");
        Ok(thread_id)
    }

    /// Record a message in a thread and return its id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] on SQLite failure.
    pub async fn insert_message(&self, thread_id: i64) -> Result<i64, StoreError> {
        let id = sqlx::query("INSERT INTO mms (thread_id) VALUES (?1)")
            .bind(thread_id)
            .execute(&self.pool)
            .await?
            .last_insert_rowid();
        Ok(id)
    }
}

#[async_trait]
impl MessageStore for SqliteStore {
    async fn thread_id_for(&self, message_id: i64) -> Result<i64, StoreError> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT thread_id FROM mms WHERE id = ?1")
            .bind(message_id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|(thread_id,)| thread_id)
            .ok_or(StoreError::MessageNotFound(message_id))
    }
}

#[async_trait]
impl ThreadStore for SqliteStore {
    async fn recipients_for(&self, thread_id: i64) -> Result<Vec<Recipient>, StoreError> {
        let rows: Vec<(i64, String)> = sqlx::query_as(
            "SELECT r.id, r.number FROM recipients r \
             JOIN thread_recipients tr ON tr.recipient_id = r.id \
             WHERE tr.thread_id = ?1 ORDER BY r.id",
        )
        .bind(thread_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|(id, number)| Recipient { id, number })
            .collect())
    }
}
