//! Persisted store
//!
//! SQLite tables for courses, lessons, activities, progress, profile and
//! vocabulary. Each table has its own query module taking a [`Database`];
//! every write announces the table it touched so reactive reads can
//! re-query.

pub mod activities;
pub mod courses;
pub mod init;
pub mod lessons;
pub mod profile;
pub mod progress;
pub mod records;
pub mod vocabulary;

pub use init::{init_database, init_memory_database};
pub use records::*;

use crate::Result;
use futures::stream::BoxStream;
use sqlx::SqlitePool;
use std::future::Future;
use tokio::sync::broadcast;
use tracing::debug;

/// Tables that announce their writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Courses,
    Lessons,
    Activities,
    UserProgress,
    UserProfile,
    Vocabulary,
}

/// Connection pool plus the write-notification channel
///
/// Cheap to clone; all clones share the pool and the channel.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
    changes: broadcast::Sender<Table>,
}

impl Database {
    /// Wrap an initialized pool (see [`init_database`])
    pub fn new(pool: SqlitePool) -> Self {
        let (changes, _) = broadcast::channel(64); // Buffer up to 64 change notices
        Self { pool, changes }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Announce a write to `table`
    pub fn notify(&self, table: Table) {
        // Ignore send errors (no observers is OK)
        let _ = self.changes.send(table);
    }

    /// Subscribe to raw change notices
    pub fn subscribe_changes(&self) -> broadcast::Receiver<Table> {
        self.changes.subscribe()
    }

    /// Reactive read: run `query` now and again after every write to `tables`
    ///
    /// Notices that arrive while a query runs are coalesced into one re-query.
    /// The stream ends only when the consumer drops it.
    pub fn observe<T, F, Fut>(&self, tables: &'static [Table], query: F) -> BoxStream<'static, Result<T>>
    where
        T: Send + 'static,
        F: Fn(Database) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        // Subscribe before the first query so no write can slip between them
        let mut rx = self.changes.subscribe();
        let db = self.clone();

        Box::pin(async_stream::stream! {
            yield query(db.clone()).await;

            loop {
                match rx.recv().await {
                    Ok(table) if tables.contains(&table) => {}
                    Ok(_) => continue,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        debug!("Observer lagged by {} change notices, re-querying", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }

                // Coalesce anything queued behind this notice
                loop {
                    match rx.try_recv() {
                        Ok(_) | Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                        Err(_) => break,
                    }
                }

                yield query(db.clone()).await;
            }
        })
    }
}
