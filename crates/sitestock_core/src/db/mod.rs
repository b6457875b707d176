//! SQLite storage bootstrap, schema migrations and the shared database handle.
//!
//! # Responsibility
//! - Open and configure SQLite connections for SiteStock core.
//! - Apply schema migrations step by step in deterministic order.
//! - Own the single process-wide connection handle.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Core code must not read/write application data before migrations succeed.
//! - A file-backed store is held by at most one `Database` per process.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

mod handle;
pub mod instance;
pub mod migrations;
mod open;
pub mod schema;

pub use handle::Database;
pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// A migration step failed and was rolled back; the database is unusable.
    Migration {
        from: u32,
        to: u32,
        source: rusqlite::Error,
    },
    MissingMigrationStep {
        from: u32,
    },
    MissingTable(&'static str),
    MissingColumn {
        table: &'static str,
        column: &'static str,
    },
    AlreadyOpen(PathBuf),
    ConflictingConfiguration {
        active: String,
        requested: String,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::Migration { from, to, source } => {
                write!(f, "migration {from} -> {to} failed: {source}")
            }
            Self::MissingMigrationStep { from } => {
                write!(f, "no migration step registered from version {from}")
            }
            Self::MissingTable(table) => write!(f, "required table `{table}` is missing"),
            Self::MissingColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
            Self::AlreadyOpen(path) => write!(
                f,
                "database `{}` is already open in this process",
                path.display()
            ),
            Self::ConflictingConfiguration { active, requested } => write!(
                f,
                "shared database already initialized at `{active}`; refusing to switch to `{requested}`"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Migration { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
