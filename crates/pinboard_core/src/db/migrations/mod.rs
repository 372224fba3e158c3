//! Schema manager for the post store.
//!
//! The schema is a numbered list of SQL steps. `PRAGMA user_version` holds
//! the number of the last step a database has taken.
//!
//! # Invariants
//! - Step numbers start at 1 and increase by exactly one.
//! - All pending steps of one call commit together or not at all.
//! - Scripts use `IF NOT EXISTS`, so replaying a step changes nothing.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::{Connection, TransactionBehavior};

struct SchemaStep {
    version: u32,
    /// Short label for the `db_migrate` event.
    label: &'static str,
    script: &'static str,
}

const SCHEMA_STEPS: &[SchemaStep] = &[SchemaStep {
    version: 1,
    label: "posts",
    script: include_str!("0001_posts.sql"),
}];

/// Highest schema version this binary can produce.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.last().map_or(0, |step| step.version)
}

/// Reads the schema version recorded in the database.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}

/// Brings the `posts` table and its indexes up to `latest_version()`.
///
/// A database already at the latest version is only read, never locked for
/// writing.
///
/// # Errors
/// - `DbError::UnsupportedSchemaVersion` when a newer binary wrote the file.
/// - `DbError::Sqlite` when the store is unreachable or a step fails.
pub fn ensure_schema(conn: &mut Connection) -> DbResult<()> {
    if !needs_upgrade(schema_version(conn)?)? {
        return Ok(());
    }

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    // Another connection may have upgraded while we waited for the lock.
    let from = schema_version(&tx)?;
    if !needs_upgrade(from)? {
        return Ok(());
    }

    let mut reached = from;
    for step in pending_steps(from) {
        tx.execute_batch(step.script)?;
        tx.pragma_update(None, "user_version", step.version)?;
        info!(
            "event=db_migrate module=db status=ok step={} version={}",
            step.label, step.version
        );
        reached = step.version;
    }
    tx.commit()?;

    info!("event=db_schema module=db status=ok from_version={from} to_version={reached}");
    Ok(())
}

fn needs_upgrade(version: u32) -> DbResult<bool> {
    let latest = latest_version();
    if version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: version,
            latest_supported: latest,
        });
    }
    Ok(version < latest)
}

fn pending_steps(from: u32) -> impl Iterator<Item = &'static SchemaStep> {
    SCHEMA_STEPS.iter().filter(move |step| step.version > from)
}
