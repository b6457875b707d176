//! Process-wide database instance.
//!
//! # Responsibility
//! - Construct the shared `Database` lazily, exactly once per process.
//! - Hand out the cached instance afterwards without locking.
//!
//! # Invariants
//! - Concurrent first access yields one instance.
//! - A failed first initialization is not cached; the next call retries.
//! - Once initialized, requests for a different location are rejected;
//!   locations are compared after path normalization.

use super::handle::Database;
use super::{DbError, DbResult};
use crate::config::DatabaseConfig;
use crate::repo::ProjectRepository;
use log::info;
use once_cell::sync::OnceCell;

static SHARED: OnceCell<Database> = OnceCell::new();

/// Returns the shared database, opening it with `config` on first access.
///
/// # Errors
/// - Bootstrap or migration failures on first access (fatal for the caller).
/// - `ConflictingConfiguration` when already initialized elsewhere.
pub fn shared_database(config: &DatabaseConfig) -> DbResult<&'static Database> {
    let db = SHARED.get_or_try_init(|| {
        info!(
            "event=db_instance module=db status=init location={}",
            config.location
        );
        Database::open(config.clone())
    })?;

    if db.config().location.normalized() != config.location.normalized() {
        return Err(DbError::ConflictingConfiguration {
            active: db.config().location.to_string(),
            requested: config.location.to_string(),
        });
    }

    Ok(db)
}

/// Returns the shared database when it has already been initialized.
pub fn try_shared_database() -> Option<&'static Database> {
    SHARED.get()
}

/// Repository bound to the shared database.
pub fn shared_repository(config: &DatabaseConfig) -> DbResult<ProjectRepository> {
    Ok(ProjectRepository::new(shared_database(config)?.clone()))
}
