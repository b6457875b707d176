//! Declared table shapes for the current schema version.
//!
//! # Responsibility
//! - Name every table, column and constraint the store relies on.
//! - Verify an opened connection actually carries that shape.
//!
//! # Invariants
//! - Declarations describe `SCHEMA_VERSION`; a migration that changes a
//!   table must update the matching `TableSpec`.

use super::{DbError, DbResult};
use rusqlite::Connection;

/// Schema version these declarations describe.
pub const SCHEMA_VERSION: u32 = 2;

pub const PROJECTS_TABLE: &str = "projects";
pub const MATERIALS_TABLE: &str = "materials";

/// Tables whose writes are published to live queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Projects,
    Materials,
}

impl Table {
    pub fn name(self) -> &'static str {
        match self {
            Self::Projects => PROJECTS_TABLE,
            Self::Materials => MATERIALS_TABLE,
        }
    }
}

/// Unit stored for materials created before the `unit` column existed.
pub const DEFAULT_MATERIAL_UNIT: &str = "pcs";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    Integer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    PrimaryKey,
    NotNull,
    Default(&'static str),
    References {
        table: &'static str,
        column: &'static str,
        on_delete_cascade: bool,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub kind: ColumnType,
    pub constraints: &'static [Constraint],
}

impl ColumnSpec {
    pub fn is_nullable(&self) -> bool {
        !self
            .constraints
            .iter()
            .any(|c| matches!(c, Constraint::NotNull | Constraint::PrimaryKey))
    }

    pub fn default_value(&self) -> Option<&'static str> {
        self.constraints.iter().find_map(|c| match c {
            Constraint::Default(value) => Some(*value),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TableSpec {
    pub name: &'static str,
    pub columns: &'static [ColumnSpec],
}

impl TableSpec {
    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|column| column.name == name)
    }
}

pub const PROJECTS: TableSpec = TableSpec {
    name: PROJECTS_TABLE,
    columns: &[
        ColumnSpec {
            name: "id",
            kind: ColumnType::Text,
            constraints: &[Constraint::PrimaryKey],
        },
        ColumnSpec {
            name: "name",
            kind: ColumnType::Text,
            constraints: &[Constraint::NotNull],
        },
        ColumnSpec {
            name: "description",
            kind: ColumnType::Text,
            constraints: &[Constraint::NotNull],
        },
        ColumnSpec {
            name: "imageUri",
            kind: ColumnType::Text,
            constraints: &[],
        },
        ColumnSpec {
            name: "createdAt",
            kind: ColumnType::Integer,
            constraints: &[Constraint::NotNull],
        },
    ],
};

pub const MATERIALS: TableSpec = TableSpec {
    name: MATERIALS_TABLE,
    columns: &[
        ColumnSpec {
            name: "id",
            kind: ColumnType::Text,
            constraints: &[Constraint::PrimaryKey],
        },
        ColumnSpec {
            name: "projectId",
            kind: ColumnType::Text,
            constraints: &[
                Constraint::NotNull,
                Constraint::References {
                    table: PROJECTS_TABLE,
                    column: "id",
                    on_delete_cascade: true,
                },
            ],
        },
        ColumnSpec {
            name: "name",
            kind: ColumnType::Text,
            constraints: &[Constraint::NotNull],
        },
        ColumnSpec {
            name: "quantity",
            kind: ColumnType::Text,
            constraints: &[Constraint::NotNull],
        },
        ColumnSpec {
            name: "price",
            kind: ColumnType::Text,
            constraints: &[Constraint::NotNull],
        },
        ColumnSpec {
            name: "description",
            kind: ColumnType::Text,
            constraints: &[Constraint::NotNull, Constraint::Default("''")],
        },
        ColumnSpec {
            name: "isPurchased",
            kind: ColumnType::Integer,
            constraints: &[Constraint::NotNull, Constraint::Default("0")],
        },
        ColumnSpec {
            name: "createdAt",
            kind: ColumnType::Integer,
            constraints: &[Constraint::NotNull],
        },
        ColumnSpec {
            name: "unit",
            kind: ColumnType::Text,
            constraints: &[Constraint::NotNull, Constraint::Default("'pcs'")],
        },
    ],
};

pub const TABLES: &[TableSpec] = &[PROJECTS, MATERIALS];

/// Checks that every declared table and column exists on `conn`.
pub fn verify_schema(conn: &Connection) -> DbResult<()> {
    for table in TABLES {
        if !table_exists(conn, table.name)? {
            return Err(DbError::MissingTable(table.name));
        }
        let actual = table_columns(conn, table.name)?;
        for column in table.columns {
            if !actual.iter().any(|name| name == column.name) {
                return Err(DbError::MissingColumn {
                    table: table.name,
                    column: column.name,
                });
            }
        }
    }
    Ok(())
}

pub(crate) fn table_exists(conn: &Connection, table: &str) -> DbResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

pub(crate) fn table_columns(conn: &Connection, table: &str) -> DbResult<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    let mut columns = Vec::new();
    while let Some(row) = rows.next()? {
        columns.push(row.get::<_, String>(1)?);
    }
    Ok(columns)
}
