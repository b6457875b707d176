//! Entity store: typed persistence over the `projects` and `materials` tables.
//!
//! # Responsibility
//! - Define DAO contracts and their SQLite implementations.
//! - Run DAO work on the blocking worker pool and publish table changes.
//! - Serve live queries that re-emit snapshots after committed writes.
//!
//! # Invariants
//! - The store never invents ids, timestamps or other defaults.
//! - Every write runs inside one `IMMEDIATE` transaction; changes are
//!   published only after commit.
//! - Absence is `Ok(None)`, never an error.

use crate::db::{Database, DbError};
use crate::db::schema::Table;
use log::warn;
use rusqlite::{Connection, ErrorCode, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use tokio::sync::OwnedMutexGuard;

pub mod entity_store;
pub mod live;
pub mod material_dao;
pub mod project_dao;
pub mod rows;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    /// Foreign-key or uniqueness invariant rejected the write.
    ConstraintViolation(String),
    /// The connection stayed held past `lock_timeout`, or SQLite reported
    /// the file locked past `busy_timeout`.
    Busy(String),
    /// The blocking worker running the operation failed.
    Worker(String),
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::ConstraintViolation(message) => write!(f, "constraint violation: {message}"),
            Self::Busy(message) => write!(f, "database busy: {message}"),
            Self::Worker(message) => write!(f, "storage worker failed: {message}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        match value {
            DbError::Sqlite(err) => Self::from(err),
            other => Self::Db(other),
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        match &value {
            rusqlite::Error::SqliteFailure(failure, message) => match failure.code {
                ErrorCode::ConstraintViolation => Self::ConstraintViolation(
                    message.clone().unwrap_or_else(|| failure.to_string()),
                ),
                ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked => {
                    Self::Busy(value.to_string())
                }
                _ => Self::Db(DbError::Sqlite(value)),
            },
            _ => Self::Db(DbError::Sqlite(value)),
        }
    }
}

/// Runs a read on the blocking pool against the shared connection.
pub(crate) async fn run_read<T, F>(db: &Database, f: F) -> StoreResult<T>
where
    F: FnOnce(&Connection) -> StoreResult<T> + Send + 'static,
    T: Send + 'static,
{
    let conn = lock_connection(db).await?;
    tokio::task::spawn_blocking(move || f(&*conn))
        .await
        .map_err(|err| StoreError::Worker(err.to_string()))?
}

/// Runs a write transaction on the blocking pool, then publishes `tables`.
///
/// The spawned task owns the work, so dropping the returned future does not
/// abort a write that has already been issued.
pub(crate) async fn run_write<T, F>(db: &Database, tables: &'static [Table], f: F) -> StoreResult<T>
where
    F: FnOnce(&Connection) -> StoreResult<T> + Send + 'static,
    T: Send + 'static,
{
    let mut conn = lock_connection(db).await?;
    let db = db.clone();
    tokio::task::spawn_blocking(move || {
        let output = {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let output = f(&*tx)?;
            tx.commit()?;
            output
        };
        drop(conn);
        for table in tables {
            db.publish(*table);
        }
        Ok(output)
    })
    .await
    .map_err(|err| StoreError::Worker(err.to_string()))?
}

/// Waits for the shared connection, up to `lock_timeout`.
async fn lock_connection(db: &Database) -> StoreResult<OwnedMutexGuard<Connection>> {
    let lock_timeout = db.config().lock_timeout;
    match tokio::time::timeout(lock_timeout, db.connection().lock_owned()).await {
        Ok(guard) => Ok(guard),
        Err(_) => {
            warn!(
                "event=db_lock module=store status=error error_code=busy waited_ms={}",
                lock_timeout.as_millis()
            );
            Err(StoreError::Busy(format!(
                "connection lock not acquired within {} ms",
                lock_timeout.as_millis()
            )))
        }
    }
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
