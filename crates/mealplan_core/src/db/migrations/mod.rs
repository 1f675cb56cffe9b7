//! Planner schema migrations.
//!
//! # Invariants
//! - Versions are contiguous from 1 and applied in order.
//! - A pending upgrade runs in one transaction; `user_version` moves with
//!   each step, so a failure leaves the previous version in place.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "dishes",
        sql: include_str!("0001_dishes.sql"),
    },
    Migration {
        version: 2,
        name: "menu_categories",
        sql: include_str!("0002_menu_categories.sql"),
    },
    Migration {
        version: 3,
        name: "shopping_lists",
        sql: include_str!("0003_shopping_lists.sql"),
    },
];

/// Schema version written by this build.
pub fn latest_version() -> u32 {
    MIGRATIONS.len() as u32
}

/// Brings `conn` up to [`latest_version`].
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the file is newer than this build.
/// - `Migration` naming the first step that failed.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from = current_user_version(conn)?;
    let latest = latest_version();
    if from > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from,
            latest_supported: latest,
        });
    }

    let pending = MIGRATIONS
        .iter()
        .filter(|migration| migration.version > from)
        .collect::<Vec<_>>();
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for migration in pending {
        tx.execute_batch(migration.sql)
            .and_then(|()| {
                tx.pragma_update(None, "user_version", migration.version)
            })
            .map_err(|source| DbError::Migration {
                version: migration.version,
                name: migration.name,
                source,
            })?;
        info!(
            "event=db_migrate module=db status=ok version={} name={}",
            migration.version, migration.name
        );
    }
    tx.commit()?;

    info!("event=db_migrate module=db status=done from={from} to={latest}");
    Ok(())
}

/// Reads the schema version stored in `PRAGMA user_version`.
pub fn current_user_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?)
}
