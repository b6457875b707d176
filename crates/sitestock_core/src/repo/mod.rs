//! Repository facade exposing domain objects to consumers.
//!
//! # Responsibility
//! - Combine the entity store and the mapper into domain-level APIs.
//! - Own entity lifecycle defaults (ids, creation timestamps).
//!
//! # Invariants
//! - Storage row types never cross this boundary.
//! - Store errors propagate unchanged.

pub mod project_repo;

pub use project_repo::{ProjectRepository, RepoResult};
