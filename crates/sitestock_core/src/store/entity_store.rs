//! Async entity store over the shared database.
//!
//! # Responsibility
//! - Expose DAO operations as `async` calls that run on the blocking pool.
//! - Publish the affected tables after each committed write.
//! - Build live row queries for projects and per-project materials.

use super::live::LiveQuery;
use super::material_dao::{MaterialDao, SqliteMaterialDao};
use super::project_dao::{ProjectDao, SqliteProjectDao};
use super::rows::{MaterialRow, ProjectRow};
use super::{run_read, run_write, StoreResult};
use crate::db::schema::Table;
use crate::db::Database;
use log::debug;

const PROJECT_TABLES: &[Table] = &[Table::Projects];
const PROJECT_DELETE_TABLES: &[Table] = &[Table::Projects, Table::Materials];
const MATERIAL_TABLES: &[Table] = &[Table::Materials];

/// Cloneable async store handle.
#[derive(Clone)]
pub struct EntityStore {
    db: Database,
}

impl EntityStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn observe_projects(&self) -> LiveQuery<ProjectRow> {
        LiveQuery::new(self.db.clone(), Table::Projects, |conn| {
            SqliteProjectDao::new(conn).all()
        })
    }

    pub async fn project_by_id(&self, id: &str) -> StoreResult<Option<ProjectRow>> {
        let id = id.to_string();
        run_read(&self.db, move |conn| SqliteProjectDao::new(conn).by_id(&id)).await
    }

    pub async fn upsert_project(&self, row: ProjectRow) -> StoreResult<()> {
        log_write(Table::Projects, "upsert", &row.id);
        run_write(&self.db, PROJECT_TABLES, move |conn| {
            SqliteProjectDao::new(conn).upsert(&row)
        })
        .await
    }

    pub async fn update_project(&self, row: ProjectRow) -> StoreResult<usize> {
        log_write(Table::Projects, "update", &row.id);
        run_write(&self.db, PROJECT_TABLES, move |conn| {
            SqliteProjectDao::new(conn).update(&row)
        })
        .await
    }

    /// Deletes the project and, through the FK cascade, all its materials.
    pub async fn delete_project(&self, row: ProjectRow) -> StoreResult<bool> {
        log_write(Table::Projects, "delete", &row.id);
        run_write(&self.db, PROJECT_DELETE_TABLES, move |conn| {
            SqliteProjectDao::new(conn).delete(&row)
        })
        .await
    }

    pub fn observe_materials_by_project(&self, project_id: &str) -> LiveQuery<MaterialRow> {
        let project_id = project_id.to_string();
        LiveQuery::new(self.db.clone(), Table::Materials, move |conn| {
            SqliteMaterialDao::new(conn).by_project(&project_id)
        })
    }

    pub async fn materials_by_project(&self, project_id: &str) -> StoreResult<Vec<MaterialRow>> {
        let project_id = project_id.to_string();
        run_read(&self.db, move |conn| {
            SqliteMaterialDao::new(conn).by_project(&project_id)
        })
        .await
    }

    pub async fn material_by_id(&self, id: &str) -> StoreResult<Option<MaterialRow>> {
        let id = id.to_string();
        run_read(&self.db, move |conn| SqliteMaterialDao::new(conn).by_id(&id)).await
    }

    pub async fn upsert_material(&self, row: MaterialRow) -> StoreResult<()> {
        log_write(Table::Materials, "upsert", &row.id);
        run_write(&self.db, MATERIAL_TABLES, move |conn| {
            SqliteMaterialDao::new(conn).upsert(&row)
        })
        .await
    }

    pub async fn update_material(&self, row: MaterialRow) -> StoreResult<usize> {
        log_write(Table::Materials, "update", &row.id);
        run_write(&self.db, MATERIAL_TABLES, move |conn| {
            SqliteMaterialDao::new(conn).update(&row)
        })
        .await
    }

    pub async fn delete_material(&self, row: MaterialRow) -> StoreResult<bool> {
        log_write(Table::Materials, "delete", &row.id);
        run_write(&self.db, MATERIAL_TABLES, move |conn| {
            SqliteMaterialDao::new(conn).delete(&row)
        })
        .await
    }

    pub async fn delete_materials_by_project(&self, project_id: &str) -> StoreResult<usize> {
        log_write(Table::Materials, "delete_by_project", project_id);
        let project_id = project_id.to_string();
        run_write(&self.db, MATERIAL_TABLES, move |conn| {
            SqliteMaterialDao::new(conn).delete_by_project(&project_id)
        })
        .await
    }
}

fn log_write(table: Table, op: &str, id: &str) {
    debug!(
        "event=store_write module=store table={} op={} id={}",
        table.name(),
        op,
        id
    );
}
