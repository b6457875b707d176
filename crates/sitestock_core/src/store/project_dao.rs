//! Project DAO contract and SQLite implementation.
//!
//! # Invariants
//! - Lists are ordered by `createdAt ASC, rowid ASC`.
//! - `upsert` never deletes the existing row, so owned materials survive a
//!   conflicting insert.

use super::rows::ProjectRow;
use super::StoreResult;
use rusqlite::{params, Connection, OptionalExtension, Row};

const PROJECT_SELECT_SQL: &str = "SELECT
    id,
    name,
    description,
    imageUri,
    createdAt
FROM projects";

/// Data access for the `projects` table.
pub trait ProjectDao {
    fn all(&self) -> StoreResult<Vec<ProjectRow>>;
    fn by_id(&self, id: &str) -> StoreResult<Option<ProjectRow>>;
    /// Inserts, or overwrites every column of the row with the same id.
    fn upsert(&self, row: &ProjectRow) -> StoreResult<()>;
    /// Returns the number of rows matched; zero is not an error.
    fn update(&self, row: &ProjectRow) -> StoreResult<usize>;
    /// Deletes by primary key; materials cascade. Returns whether a row went.
    fn delete(&self, row: &ProjectRow) -> StoreResult<bool>;
}

pub struct SqliteProjectDao<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProjectDao<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ProjectDao for SqliteProjectDao<'_> {
    fn all(&self) -> StoreResult<Vec<ProjectRow>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PROJECT_SELECT_SQL} ORDER BY createdAt ASC, rowid ASC;"))?;
        let rows = stmt.query_map([], parse_project_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn by_id(&self, id: &str) -> StoreResult<Option<ProjectRow>> {
        let row = self
            .conn
            .query_row(
                &format!("{PROJECT_SELECT_SQL} WHERE id = ?1;"),
                [id],
                parse_project_row,
            )
            .optional()?;
        Ok(row)
    }

    fn upsert(&self, row: &ProjectRow) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO projects (id, name, description, imageUri, createdAt)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                description = excluded.description,
                imageUri = excluded.imageUri,
                createdAt = excluded.createdAt;",
            params![
                row.id.as_str(),
                row.name.as_str(),
                row.description.as_str(),
                row.image_uri.as_deref(),
                row.created_at,
            ],
        )?;
        Ok(())
    }

    fn update(&self, row: &ProjectRow) -> StoreResult<usize> {
        let changed = self.conn.execute(
            "UPDATE projects
             SET
                name = ?2,
                description = ?3,
                imageUri = ?4,
                createdAt = ?5
             WHERE id = ?1;",
            params![
                row.id.as_str(),
                row.name.as_str(),
                row.description.as_str(),
                row.image_uri.as_deref(),
                row.created_at,
            ],
        )?;
        Ok(changed)
    }

    fn delete(&self, row: &ProjectRow) -> StoreResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM projects WHERE id = ?1;", [row.id.as_str()])?;
        Ok(changed > 0)
    }
}

fn parse_project_row(row: &Row<'_>) -> rusqlite::Result<ProjectRow> {
    Ok(ProjectRow {
        id: row.get("id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        image_uri: row.get("imageUri")?,
        created_at: row.get("createdAt")?,
    })
}
