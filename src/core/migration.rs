//! Schema version detection and migration.
//!
//! The container records its schema version in `PRAGMA user_version`. A fresh
//! container reports version 0, so the v1 migration doubles as one-time
//! structural setup. Raising `PREFERENCES_SCHEMA_VERSION` requires appending a
//! migration here; `init` runs every pending step before the store is usable.

use crate::core::error::StoreError;
use crate::core::schemas;
use log::info;
use rusqlite::Connection;

/// Migration definition
pub struct Migration {
    /// Schema version this migration produces.
    pub target_version: u32,
    /// Human-readable description
    pub description: &'static str,
    /// Migration function
    pub up: fn(&Connection) -> Result<(), StoreError>,
}

/// All migrations in ascending version order.
pub fn all_migrations() -> Vec<Migration> {
    vec![Migration {
        target_version: 1,
        description: "Create preferences table and key index",
        up: migrate_create_preferences,
    }]
}

pub fn stored_version(conn: &Connection) -> Result<u32, StoreError> {
    let version: i64 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    u32::try_from(version).map_err(|_| StoreError::Migration {
        version: 0,
        detail: format!("stored schema version {} is out of range", version),
    })
}

/// Bring the container up to `target`, returning the number of migrations applied.
///
/// All pending steps and the version bump commit in one transaction, so an
/// interrupted upgrade leaves the container at its previous version.
pub fn check_and_migrate(conn: &mut Connection, target: u32) -> Result<usize, StoreError> {
    let from = stored_version(conn)?;

    if from == target {
        return Ok(0);
    }
    if from > target {
        return Err(StoreError::Migration {
            version: from,
            detail: format!(
                "container schema v{} is newer than supported v{}",
                from, target
            ),
        });
    }

    let tx = conn.transaction()?;
    let mut applied = 0;
    for migration in all_migrations() {
        if !should_run_migration(from, target, migration.target_version) {
            continue;
        }
        info!(
            "schema v{} -> v{}: {}",
            from, migration.target_version, migration.description
        );
        (migration.up)(&*tx).map_err(|e| StoreError::Migration {
            version: migration.target_version,
            detail: e.to_string(),
        })?;
        applied += 1;
    }
    tx.pragma_update(None, "user_version", target)?;
    tx.commit()?;

    Ok(applied)
}

fn should_run_migration(from: u32, target: u32, migration_version: u32) -> bool {
    migration_version > from && migration_version <= target
}

fn migrate_create_preferences(conn: &Connection) -> Result<(), StoreError> {
    conn.execute(schemas::PREFERENCES_DB_SCHEMA, [])?;
    conn.execute(schemas::PREFERENCES_DB_SCHEMA_INDEX, [])?;
    Ok(())
}
