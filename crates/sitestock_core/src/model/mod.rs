//! Domain model for construction projects and their materials.
//!
//! # Responsibility
//! - Define the value objects handed to consumers of the repository.
//!
//! # Invariants
//! - Domain objects never carry storage-only fields such as foreign keys.
//! - An empty `id` or zero `created_at` means "not assigned yet"; the
//!   repository fills them in on insert.

pub mod material;
pub mod project;
