//! SQLite storage bootstrap, schema management and connection pooling.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the post store.
//! - Apply schema migrations in deterministic order.
//! - Seed bootstrap posts into an empty store.
//! - Hand out request-scoped connections from a process-owned pool.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - No repository can be constructed before `startup` has returned, so
//!   schema and seed always run first.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;
mod pool;
pub mod seed;

pub use migrations::ensure_schema;
pub use open::{open_db, open_db_in_memory};
pub use pool::{startup, ConnectionPool, PooledConnection};
pub use seed::{seed_if_empty, SeedPost, DEFAULT_SEED_POSTS};

pub type DbResult<T> = Result<T, DbError>;

/// SQL expression for the current UTC time as a lexically sortable
/// `YYYY-MM-DDTHH:MM:SS.fff` string.
pub(crate) const SQL_NOW: &str = "strftime('%Y-%m-%dT%H:%M:%f', 'now')";

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// The pool could not hand out a connection within the acquire timeout.
    Pool(r2d2::Error),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::Pool(err) => write!(f, "connection pool: {err}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Pool(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<r2d2::Error> for DbError {
    fn from(value: r2d2::Error) -> Self {
        Self::Pool(value)
    }
}
