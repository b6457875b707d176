//! Core persistence for SiteStock: construction projects and their materials.
//! This crate is the single source of truth for storage invariants.

pub mod config;
pub mod db;
pub mod export;
pub mod logging;
pub mod mapper;
pub mod model;
pub mod repo;
pub mod store;

pub use config::{DatabaseConfig, DbLocation};
pub use db::instance::{shared_database, shared_repository};
pub use db::{Database, DbError, DbResult};
pub use export::{export_materials_csv, ExportOutcome};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::material::Material;
pub use model::project::Project;
pub use repo::{ProjectRepository, RepoResult};
pub use store::live::LiveQuery;
pub use store::{StoreError, StoreResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
