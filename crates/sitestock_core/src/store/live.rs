//! Live queries: result sets that re-emit after every committed write.
//!
//! # Responsibility
//! - Subscribe to a table's change feed before taking the first snapshot.
//! - Re-run the query on the blocking pool after each relevant change.
//!
//! # Invariants
//! - The first item is always the current snapshot.
//! - A write committed after subscription produces at least one later
//!   snapshot that reflects it; bursts of writes may coalesce into one.
//! - After an error item the sequence is finished; callers re-subscribe.
//! - Dropping the query releases its channel receiver immediately.

use super::{run_read, StoreResult};
use crate::db::schema::Table;
use crate::db::Database;
use futures::Stream;
use log::debug;
use rusqlite::Connection;
use std::sync::Arc;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::sync::broadcast::Receiver;

type SnapshotFn<T> = Arc<dyn Fn(&Connection) -> StoreResult<Vec<T>> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LiveState {
    Initial,
    Watching,
    Finished,
}

/// A continuously updated query over one table.
pub struct LiveQuery<T> {
    db: Database,
    table: Table,
    changes: Receiver<Table>,
    snapshot: SnapshotFn<T>,
    state: LiveState,
}

impl<T: Send + 'static> LiveQuery<T> {
    pub(crate) fn new<F>(db: Database, table: Table, snapshot: F) -> Self
    where
        F: Fn(&Connection) -> StoreResult<Vec<T>> + Send + Sync + 'static,
    {
        let changes = db.subscribe();
        debug!(
            "event=live_query module=store status=subscribed table={}",
            table.name()
        );
        Self {
            db,
            table,
            changes,
            snapshot: Arc::new(snapshot),
            state: LiveState::Initial,
        }
    }

    /// Waits for the next snapshot.
    ///
    /// Returns `None` once the sequence has finished.
    pub async fn next(&mut self) -> Option<StoreResult<Vec<T>>> {
        match self.state {
            LiveState::Finished => return None,
            LiveState::Initial => self.state = LiveState::Watching,
            LiveState::Watching => {
                if !self.wait_for_change().await {
                    self.state = LiveState::Finished;
                    return None;
                }
                self.drain_pending();
            }
        }

        let snapshot = Arc::clone(&self.snapshot);
        let result = run_read(&self.db, move |conn| snapshot(conn)).await;
        if let Err(err) = &result {
            debug!(
                "event=live_query module=store status=error table={} error={}",
                self.table.name(),
                err
            );
            self.state = LiveState::Finished;
        }
        Some(result)
    }

    /// Maps every item of every snapshot through `f`.
    pub fn map<U, F>(self, f: F) -> LiveQuery<U>
    where
        U: Send + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        let inner = self.snapshot;
        LiveQuery {
            db: self.db,
            table: self.table,
            changes: self.changes,
            snapshot: Arc::new(move |conn: &Connection| {
                inner(conn).map(|items| items.into_iter().map(&f).collect())
            }),
            state: self.state,
        }
    }

    /// Adapts the query into a `Stream` of snapshots.
    pub fn into_stream(self) -> impl Stream<Item = StoreResult<Vec<T>>> {
        futures::stream::unfold(self, |mut query| async move {
            let item = query.next().await?;
            Some((item, query))
        })
    }

    async fn wait_for_change(&mut self) -> bool {
        loop {
            match self.changes.recv().await {
                Ok(table) if table == self.table => return true,
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    debug!(
                        "event=live_query module=store status=lagged table={} skipped={}",
                        self.table.name(),
                        skipped
                    );
                    return true;
                }
                Err(RecvError::Closed) => return false,
            }
        }
    }

    /// Coalesces notifications that arrived before the snapshot is taken.
    fn drain_pending(&mut self) {
        loop {
            match self.changes.try_recv() {
                Ok(_) | Err(TryRecvError::Lagged(_)) => continue,
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
    }
}
