//! Material DAO contract and SQLite implementation.
//!
//! # Invariants
//! - Every row references an existing project (enforced by the FK).
//! - Per-project lists are ordered by `createdAt ASC, rowid ASC`.
//! - Read paths reject invalid persisted flags instead of masking them.

use super::rows::MaterialRow;
use super::{bool_to_int, StoreError, StoreResult};
use rusqlite::{params, Connection, Row};

const MATERIAL_SELECT_SQL: &str = "SELECT
    id,
    projectId,
    name,
    quantity,
    price,
    description,
    isPurchased,
    createdAt,
    unit
FROM materials";

/// Data access for the `materials` table.
pub trait MaterialDao {
    fn by_project(&self, project_id: &str) -> StoreResult<Vec<MaterialRow>>;
    fn by_id(&self, id: &str) -> StoreResult<Option<MaterialRow>>;
    fn upsert(&self, row: &MaterialRow) -> StoreResult<()>;
    fn update(&self, row: &MaterialRow) -> StoreResult<usize>;
    fn delete(&self, row: &MaterialRow) -> StoreResult<bool>;
    fn delete_by_project(&self, project_id: &str) -> StoreResult<usize>;
}

pub struct SqliteMaterialDao<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMaterialDao<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl MaterialDao for SqliteMaterialDao<'_> {
    fn by_project(&self, project_id: &str) -> StoreResult<Vec<MaterialRow>> {
        let mut stmt = self.conn.prepare(&format!(
            "{MATERIAL_SELECT_SQL}
             WHERE projectId = ?1
             ORDER BY createdAt ASC, rowid ASC;"
        ))?;
        let mut rows = stmt.query([project_id])?;
        let mut materials = Vec::new();
        while let Some(row) = rows.next()? {
            materials.push(parse_material_row(row)?);
        }
        Ok(materials)
    }

    fn by_id(&self, id: &str) -> StoreResult<Option<MaterialRow>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{MATERIAL_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_material_row(row)?));
        }
        Ok(None)
    }

    fn upsert(&self, row: &MaterialRow) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO materials (
                id,
                projectId,
                name,
                quantity,
                price,
                description,
                isPurchased,
                createdAt,
                unit
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ON CONFLICT(id) DO UPDATE SET
                projectId = excluded.projectId,
                name = excluded.name,
                quantity = excluded.quantity,
                price = excluded.price,
                description = excluded.description,
                isPurchased = excluded.isPurchased,
                createdAt = excluded.createdAt,
                unit = excluded.unit;",
            params![
                row.id.as_str(),
                row.project_id.as_str(),
                row.name.as_str(),
                row.quantity.as_str(),
                row.price.as_str(),
                row.description.as_str(),
                bool_to_int(row.is_purchased),
                row.created_at,
                row.unit.as_str(),
            ],
        )?;
        Ok(())
    }

    fn update(&self, row: &MaterialRow) -> StoreResult<usize> {
        let changed = self.conn.execute(
            "UPDATE materials
             SET
                projectId = ?2,
                name = ?3,
                quantity = ?4,
                price = ?5,
                description = ?6,
                isPurchased = ?7,
                createdAt = ?8,
                unit = ?9
             WHERE id = ?1;",
            params![
                row.id.as_str(),
                row.project_id.as_str(),
                row.name.as_str(),
                row.quantity.as_str(),
                row.price.as_str(),
                row.description.as_str(),
                bool_to_int(row.is_purchased),
                row.created_at,
                row.unit.as_str(),
            ],
        )?;
        Ok(changed)
    }

    fn delete(&self, row: &MaterialRow) -> StoreResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM materials WHERE id = ?1;", [row.id.as_str()])?;
        Ok(changed > 0)
    }

    fn delete_by_project(&self, project_id: &str) -> StoreResult<usize> {
        let changed = self
            .conn
            .execute("DELETE FROM materials WHERE projectId = ?1;", [project_id])?;
        Ok(changed)
    }
}

fn parse_material_row(row: &Row<'_>) -> StoreResult<MaterialRow> {
    let is_purchased = match row.get::<_, i64>("isPurchased")? {
        0 => false,
        1 => true,
        other => {
            return Err(StoreError::InvalidData(format!(
                "invalid isPurchased value `{other}` in materials.isPurchased"
            )));
        }
    };

    Ok(MaterialRow {
        id: row.get("id")?,
        project_id: row.get("projectId")?,
        name: row.get("name")?,
        quantity: row.get("quantity")?,
        price: row.get("price")?,
        description: row.get("description")?,
        is_purchased,
        created_at: row.get("createdAt")?,
        unit: row.get("unit")?,
    })
}
