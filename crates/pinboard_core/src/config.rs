//! Store configuration.
//!
//! # Invariants
//! - In-memory stores always run with exactly one connection; the database
//!   lives inside that connection.

use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_DB_FILE_NAME: &str = "pinboard.sqlite3";
const DEFAULT_MAX_CONNECTIONS: u32 = 4;
const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Where the post table is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbLocation {
    File(PathBuf),
    Memory,
}

/// Settings for opening the post store and its connection pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub location: DbLocation,
    /// Upper bound on simultaneously open connections.
    pub max_connections: u32,
    /// How long `ConnectionPool::acquire` waits for a connection. Zero is
    /// raised to one millisecond.
    pub acquire_timeout: Duration,
    /// SQLite busy handler timeout for writer contention.
    pub busy_timeout: Duration,
    /// Insert the default seed posts when the table is empty at startup.
    pub seed_on_start: bool,
}

impl StoreConfig {
    /// Config for a database file at `path` with default pool settings.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            location: DbLocation::File(path.into()),
            ..Self::default()
        }
    }

    /// Config for a private in-memory database.
    pub fn in_memory() -> Self {
        Self {
            location: DbLocation::Memory,
            ..Self::default()
        }
    }

    /// Builder-style toggle for startup seeding.
    pub fn with_seed_on_start(mut self, seed_on_start: bool) -> Self {
        self.seed_on_start = seed_on_start;
        self
    }

    /// Builder-style override for the pool size.
    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }

    /// Pool size actually used: at least one, and exactly one in memory.
    pub fn effective_max_connections(&self) -> u32 {
        match self.location {
            DbLocation::Memory => 1,
            DbLocation::File(_) => self.max_connections.max(1),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            location: DbLocation::File(PathBuf::from(DEFAULT_DB_FILE_NAME)),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            acquire_timeout: DEFAULT_ACQUIRE_TIMEOUT,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
            seed_on_start: true,
        }
    }
}
