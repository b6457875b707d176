//! Database configuration.
//!
//! # Responsibility
//! - Describe where the store lives and how contention is handled.
//! - Resolve the default location from the environment.

use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DB_PATH_ENV: &str = "SITESTOCK_DB_PATH";
const DEFAULT_DB_FILE_NAME: &str = "sitestock.sqlite3";
const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_NOTIFY_CAPACITY: usize = 64;

/// Backing storage location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbLocation {
    File(PathBuf),
    Memory,
}

impl DbLocation {
    /// Same location with a file path made absolute and `.` components
    /// dropped, so two spellings of one file compare equal.
    pub fn normalized(&self) -> Self {
        match self {
            Self::File(path) => Self::File(absolute_path(path)),
            Self::Memory => Self::Memory,
        }
    }
}

pub(crate) fn absolute_path(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

impl Display for DbLocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Memory => write!(f, ":memory:"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub location: DbLocation,
    /// How long SQLite itself waits on a locked database file.
    pub busy_timeout: Duration,
    /// Longest wait for the shared connection before reporting `Busy`.
    pub lock_timeout: Duration,
    /// Buffered table-change notifications per live subscriber.
    pub notify_capacity: usize,
}

impl DatabaseConfig {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            location: DbLocation::File(path.into()),
            ..Self::default()
        }
    }

    pub fn in_memory() -> Self {
        Self {
            location: DbLocation::Memory,
            ..Self::default()
        }
    }

    /// Uses `SITESTOCK_DB_PATH` when set and non-blank, else the default file.
    pub fn from_env() -> Self {
        match std::env::var(DB_PATH_ENV) {
            Ok(raw) if !raw.trim().is_empty() => Self::file(raw.trim()),
            _ => Self::default(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            location: DbLocation::File(std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
            notify_capacity: DEFAULT_NOTIFY_CAPACITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DatabaseConfig, DbLocation};

    #[test]
    fn default_points_at_temp_dir_file() {
        let config = DatabaseConfig::default();
        match config.location {
            DbLocation::File(path) => {
                assert!(path.starts_with(std::env::temp_dir()));
                assert!(path.ends_with("sitestock.sqlite3"));
            }
            DbLocation::Memory => panic!("default must be file-backed"),
        }
        assert!(!config.lock_timeout.is_zero());
    }

    #[test]
    fn normalized_treats_dot_prefixed_path_as_same_file() {
        let plain = DbLocation::File("site.db".into()).normalized();
        let dotted = DbLocation::File("./site.db".into()).normalized();
        assert_eq!(plain, dotted);
        match plain {
            DbLocation::File(path) => assert!(path.is_absolute()),
            DbLocation::Memory => panic!("file location must stay file-backed"),
        }
        assert_eq!(DbLocation::Memory.normalized(), DbLocation::Memory);
    }

    #[test]
    fn in_memory_keeps_default_tuning() {
        let config = DatabaseConfig::in_memory();
        assert_eq!(config.location, DbLocation::Memory);
        assert_eq!(config.busy_timeout, DatabaseConfig::default().busy_timeout);
        assert_eq!(config.location.to_string(), ":memory:");
    }
}
