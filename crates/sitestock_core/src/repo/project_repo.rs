//! Project/material repository.
//!
//! # Responsibility
//! - Provide insert/update/delete/get/observe APIs over domain objects.
//! - Assign missing project ids (UUID v4) and creation timestamps.
//!
//! # Invariants
//! - Inserts are upserts: an existing id is overwritten (last write wins).
//! - Deleting a project removes its materials in the same transaction.
//! - Every write is visible to live queries registered before it completed.

use crate::db::Database;
use crate::mapper::{
    epoch_millis, material_to_domain, material_to_row, project_to_domain, project_to_row,
};
use crate::model::material::Material;
use crate::model::project::Project;
use crate::store::entity_store::EntityStore;
use crate::store::live::LiveQuery;
use crate::store::StoreError;
use log::info;
use uuid::Uuid;

pub type RepoResult<T> = Result<T, StoreError>;

/// Domain-level access to projects and materials.
#[derive(Clone)]
pub struct ProjectRepository {
    store: EntityStore,
}

impl ProjectRepository {
    pub fn new(db: Database) -> Self {
        Self {
            store: EntityStore::new(db),
        }
    }

    pub fn database(&self) -> &Database {
        self.store.database()
    }

    pub fn observe_projects(&self) -> LiveQuery<Project> {
        self.store.observe_projects().map(project_to_domain)
    }

    pub async fn project_by_id(&self, id: &str) -> RepoResult<Option<Project>> {
        Ok(self.store.project_by_id(id).await?.map(project_to_domain))
    }

    /// Persists `project` and returns the id it was stored under.
    ///
    /// # Contract
    /// - Empty `id` -> new UUID v4.
    /// - Zero `created_at` -> current epoch milliseconds.
    pub async fn insert_project(&self, project: &Project) -> RepoResult<String> {
        let mut project = project.clone();
        if project.id.is_empty() {
            project.id = Uuid::new_v4().to_string();
        }
        if project.created_at == 0 {
            project.created_at = epoch_millis();
        }

        self.store.upsert_project(project_to_row(&project)).await?;
        info!(
            "event=project_insert module=repo status=ok project_id={}",
            project.id
        );
        Ok(project.id)
    }

    /// Returns whether a stored project matched.
    pub async fn update_project(&self, project: &Project) -> RepoResult<bool> {
        let changed = self.store.update_project(project_to_row(project)).await?;
        Ok(changed > 0)
    }

    /// Deletes the project and every material it owns.
    pub async fn delete_project(&self, project: &Project) -> RepoResult<bool> {
        let deleted = self.store.delete_project(project_to_row(project)).await?;
        info!(
            "event=project_delete module=repo status=ok project_id={} deleted={}",
            project.id, deleted
        );
        Ok(deleted)
    }

    pub fn observe_materials_by_project(&self, project_id: &str) -> LiveQuery<Material> {
        self.store
            .observe_materials_by_project(project_id)
            .map(material_to_domain)
    }

    /// One-shot snapshot of a project's materials, oldest first.
    pub async fn materials_by_project(&self, project_id: &str) -> RepoResult<Vec<Material>> {
        let rows = self.store.materials_by_project(project_id).await?;
        Ok(rows.into_iter().map(material_to_domain).collect())
    }

    pub async fn material_by_id(&self, id: &str) -> RepoResult<Option<Material>> {
        Ok(self.store.material_by_id(id).await?.map(material_to_domain))
    }

    /// Persists `material` under `project_id` and returns its id.
    ///
    /// # Contract
    /// - Empty `id` -> timestamp-derived id (assigned by the mapper).
    /// - Zero `created_at` -> current epoch milliseconds.
    ///
    /// # Errors
    /// - `ConstraintViolation` when `project_id` does not exist.
    pub async fn insert_material(
        &self,
        material: &Material,
        project_id: &str,
    ) -> RepoResult<String> {
        let mut row = material_to_row(material, project_id);
        if row.created_at == 0 {
            row.created_at = epoch_millis();
        }
        let id = row.id.clone();
        self.store.upsert_material(row).await?;
        Ok(id)
    }

    /// Returns whether a stored material matched; an unsaved material never
    /// does.
    pub async fn update_material(&self, material: &Material, project_id: &str) -> RepoResult<bool> {
        if material.id.is_empty() {
            return Ok(false);
        }
        let changed = self
            .store
            .update_material(material_to_row(material, project_id))
            .await?;
        Ok(changed > 0)
    }

    pub async fn delete_material(&self, material: &Material) -> RepoResult<bool> {
        if material.id.is_empty() {
            return Ok(false);
        }
        // Deletion is keyed by id only; the owner column is not consulted.
        self.store
            .delete_material(material_to_row(material, ""))
            .await
    }

    pub async fn delete_materials_by_project(&self, project_id: &str) -> RepoResult<usize> {
        self.store.delete_materials_by_project(project_id).await
    }
}
