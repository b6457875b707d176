//! Shared database handle.
//!
//! # Responsibility
//! - Own the one migrated SQLite connection for a backing store.
//! - Own the table-change channel that feeds live queries.
//!
//! # Invariants
//! - A file path is claimed by at most one live `Database` per process; the
//!   claim is released when the last clone is dropped.

use super::migrations::current_user_version;
use super::open::open_connection;
use super::schema::Table;
use super::{DbError, DbResult};
use crate::config::{absolute_path, DatabaseConfig, DbLocation};
use log::{debug, warn};
use once_cell::sync::Lazy;
use rusqlite::Connection;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{broadcast, Mutex as AsyncMutex};

static OPEN_FILES: Lazy<Mutex<HashSet<PathBuf>>> = Lazy::new(|| Mutex::new(HashSet::new()));

/// Cloneable handle to one migrated SQLite store.
#[derive(Clone, Debug)]
pub struct Database {
    inner: Arc<DatabaseInner>,
}

#[derive(Debug)]
struct DatabaseInner {
    conn: Arc<AsyncMutex<Connection>>,
    changes: broadcast::Sender<Table>,
    config: DatabaseConfig,
    claimed_path: Option<PathBuf>,
}

impl Database {
    /// Opens, migrates and verifies the store described by `config`.
    ///
    /// Application code reaches the store through
    /// [`crate::db::instance::shared_database`]; this constructor exists for
    /// isolated stores (tests, tooling).
    ///
    /// # Errors
    /// - `AlreadyOpen` when another live handle holds the same file.
    /// - Any bootstrap or migration failure from [`crate::db::open_db`].
    pub fn open(config: DatabaseConfig) -> DbResult<Self> {
        let claimed_path = match &config.location {
            DbLocation::File(path) => Some(claim_path(path)?),
            DbLocation::Memory => None,
        };

        let conn = match open_connection(&config.location, config.busy_timeout) {
            Ok(conn) => conn,
            Err(err) => {
                if let Some(path) = claimed_path.as_ref() {
                    release_path(path);
                }
                return Err(err);
            }
        };

        let (changes, _) = broadcast::channel(config.notify_capacity.max(1));
        Ok(Self {
            inner: Arc::new(DatabaseInner {
                conn: Arc::new(AsyncMutex::new(conn)),
                changes,
                config,
                claimed_path,
            }),
        })
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.inner.config
    }

    /// Reads `PRAGMA user_version` from the live connection.
    pub async fn schema_version(&self) -> DbResult<u32> {
        let conn = self.inner.conn.lock().await;
        current_user_version(&conn)
    }

    /// Returns `true` when both handles share one connection.
    pub fn same_instance(&self, other: &Database) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn connection(&self) -> Arc<AsyncMutex<Connection>> {
        Arc::clone(&self.inner.conn)
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<Table> {
        self.inner.changes.subscribe()
    }

    /// Publishes a committed change to every live subscriber.
    pub(crate) fn publish(&self, table: Table) {
        // Zero receivers only means nobody is observing.
        let receivers = self.inner.changes.send(table).unwrap_or(0);
        debug!(
            "event=table_changed module=db table={} receivers={}",
            table.name(),
            receivers
        );
    }
}

impl Drop for DatabaseInner {
    fn drop(&mut self) {
        if let Some(path) = self.claimed_path.as_ref() {
            release_path(path);
        }
    }
}

fn claim_path(path: &Path) -> DbResult<PathBuf> {
    let key = absolute_path(path);
    let mut open = OPEN_FILES.lock().unwrap_or_else(PoisonError::into_inner);
    if !open.insert(key.clone()) {
        warn!(
            "event=db_open module=db status=error error_code=already_open path={}",
            key.display()
        );
        return Err(DbError::AlreadyOpen(key));
    }
    Ok(key)
}

fn release_path(path: &Path) {
    let mut open = OPEN_FILES.lock().unwrap_or_else(PoisonError::into_inner);
    open.remove(path);
}
