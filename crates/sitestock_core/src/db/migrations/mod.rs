//! SQLite migration registry and executor.
//!
//! # Responsibility
//! - Register schema migration steps tagged with their source and target
//!   versions.
//! - Apply pending steps one at a time, each inside its own transaction.
//!
//! # Invariants
//! - Steps are contiguous: step `n` migrates `n -> n + 1`.
//! - Applied version is mirrored to `PRAGMA user_version` in the same
//!   transaction as the step, so a failed step leaves no partial state.

use crate::db::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
pub struct Migration {
    pub from_version: u32,
    pub to_version: u32,
    pub sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        from_version: 0,
        to_version: 1,
        sql: include_str!("0001_init.sql"),
    },
    Migration {
        from_version: 1,
        to_version: 2,
        sql: include_str!("0002_material_unit.sql"),
    },
];

/// Returns the latest schema version known by this binary.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.to_version)
}

/// Returns the registered steps in application order.
pub fn registered_migrations() -> &'static [Migration] {
    MIGRATIONS
}

/// Applies all pending migrations on the provided connection.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    apply_steps(conn, MIGRATIONS, latest_version())
}

/// Applies pending migrations up to `target` only.
///
/// Used to materialize older schema versions, e.g. when preparing a legacy
/// database for upgrade tests.
pub fn apply_migrations_to(conn: &mut Connection, target: u32) -> DbResult<()> {
    apply_steps(conn, MIGRATIONS, target.min(latest_version()))
}

/// Reads the on-disk schema version.
pub fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

pub(crate) fn apply_steps(
    conn: &mut Connection,
    steps: &[Migration],
    target: u32,
) -> DbResult<()> {
    let mut version = current_user_version(conn)?;
    let latest = steps.last().map_or(0, |step| step.to_version);

    if version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: version,
            latest_supported: latest,
        });
    }

    while version < target {
        let step = steps
            .iter()
            .find(|step| step.from_version == version && step.to_version == version + 1)
            .ok_or(DbError::MissingMigrationStep { from: version })?;

        if let Err(source) = apply_step(conn, step) {
            error!(
                "event=db_migrate module=db status=error from={} to={} error={}",
                step.from_version, step.to_version, source
            );
            return Err(DbError::Migration {
                from: step.from_version,
                to: step.to_version,
                source,
            });
        }

        info!(
            "event=db_migrate module=db status=ok from={} to={}",
            step.from_version, step.to_version
        );
        version = step.to_version;
    }

    Ok(())
}

fn apply_step(conn: &mut Connection, step: &Migration) -> Result<(), rusqlite::Error> {
    let tx = conn.transaction()?;
    tx.execute_batch(step.sql)?;
    tx.execute_batch(&format!("PRAGMA user_version = {};", step.to_version))?;
    tx.commit()
}

#[cfg(test)]
mod tests {
    use super::{apply_steps, current_user_version, latest_version, registered_migrations};
    use super::{DbError, Migration};
    use rusqlite::Connection;

    #[test]
    fn registry_ends_at_declared_schema_version() {
        assert_eq!(latest_version(), crate::db::schema::SCHEMA_VERSION);
    }

    #[test]
    fn registry_is_contiguous_from_zero() {
        let steps = registered_migrations();
        for (idx, step) in steps.iter().enumerate() {
            assert_eq!(step.from_version, idx as u32);
            assert_eq!(step.to_version, idx as u32 + 1);
        }
        assert_eq!(latest_version(), 2);
    }

    #[test]
    fn failing_step_rolls_back_and_reports_versions() {
        let steps = [
            Migration {
                from_version: 0,
                to_version: 1,
                sql: "CREATE TABLE t (id INTEGER PRIMARY KEY);",
            },
            Migration {
                from_version: 1,
                to_version: 2,
                sql: "ALTER TABLE t ADD COLUMN a TEXT; ALTER TABLE missing ADD COLUMN b TEXT;",
            },
        ];
        let mut conn = Connection::open_in_memory().unwrap();

        let err = apply_steps(&mut conn, &steps, 2).unwrap_err();
        assert!(matches!(err, DbError::Migration { from: 1, to: 2, .. }));

        assert_eq!(current_user_version(&conn).unwrap(), 1);
        let columns: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM pragma_table_info('t') WHERE name = 'a';",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(columns, 0, "partial step must not survive");
    }

    #[test]
    fn gap_in_registry_is_reported() {
        let steps = [Migration {
            from_version: 1,
            to_version: 2,
            sql: "SELECT 1;",
        }];
        let mut conn = Connection::open_in_memory().unwrap();

        let err = apply_steps(&mut conn, &steps, 2).unwrap_err();
        assert!(matches!(err, DbError::MissingMigrationStep { from: 0 }));
    }
}
