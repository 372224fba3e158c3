//! Process-owned SQLite connection pool.
//!
//! # Responsibility
//! - Own every connection to the post store for the process lifetime.
//! - Hand out request-scoped connections; r2d2 takes them back on drop.
//! - Run pragmas and the schema manager on every connection it opens.
//!
//! # Invariants
//! - At most `StoreConfig::effective_max_connections()` connections exist.
//! - File stores are bootstrapped once before the pool is built, so schema
//!   errors surface from `ConnectionPool::open` as typed errors.
//! - In-memory connections are never reaped; the database lives inside
//!   the single connection.

use super::open::{bootstrap_logged, open_logged, OpenMode};
use super::seed::{seed_if_empty, DEFAULT_SEED_POSTS};
use super::{DbError, DbResult};
use crate::config::{DbLocation, StoreConfig};
use log::{info, warn};
use r2d2::{CustomizeConnection, Pool};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{ffi, Connection};
use std::time::{Duration, Instant};

const MIN_ACQUIRE_TIMEOUT: Duration = Duration::from_millis(1);

/// Connection on loan from a `ConnectionPool`; returned when dropped.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// Pool of bootstrapped SQLite connections.
#[derive(Clone)]
pub struct ConnectionPool {
    config: StoreConfig,
    inner: Pool<SqliteConnectionManager>,
}

impl std::fmt::Debug for ConnectionPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state();
        f.debug_struct("ConnectionPool")
            .field("location", &self.config.location)
            .field("connections", &state.connections)
            .field("idle", &state.idle_connections)
            .finish()
    }
}

/// Runs busy timeout, WAL and the schema manager on each new connection.
#[derive(Debug, Clone, Copy)]
struct ConnectionBootstrap {
    mode: OpenMode,
    busy_timeout: Duration,
}

impl CustomizeConnection<Connection, rusqlite::Error> for ConnectionBootstrap {
    fn on_acquire(&self, conn: &mut Connection) -> Result<(), rusqlite::Error> {
        bootstrap_logged(conn, self.mode, self.busy_timeout).map_err(|err| match err {
            DbError::Sqlite(err) => err,
            // r2d2 only carries the manager's error type.
            other => rusqlite::Error::SqliteFailure(
                ffi::Error::new(ffi::SQLITE_ERROR),
                Some(other.to_string()),
            ),
        })
    }
}

/// Opens the pool and seeds the store when configured to.
///
/// This is the only way callers are expected to obtain a pool, so schema
/// creation and seeding happen exactly once, before any repository exists.
pub fn startup(config: StoreConfig) -> DbResult<ConnectionPool> {
    let started_at = Instant::now();
    let pool = ConnectionPool::open(config)?;

    if pool.config.seed_on_start {
        let mut conn = pool.acquire()?;
        seed_if_empty(&mut conn, DEFAULT_SEED_POSTS)?;
    }

    info!(
        "event=store_startup module=db status=ok duration_ms={}",
        started_at.elapsed().as_millis()
    );
    Ok(pool)
}

impl ConnectionPool {
    /// Builds the pool, running the schema manager first. Does not seed.
    pub fn open(config: StoreConfig) -> DbResult<Self> {
        let (manager, mode) = match &config.location {
            DbLocation::File(path) => {
                // Typed schema errors here; r2d2 would only report them as text
                // after the connection timeout.
                open_logged(OpenMode::File, config.busy_timeout, || Connection::open(path))?;
                (SqliteConnectionManager::file(path), OpenMode::File)
            }
            DbLocation::Memory => (SqliteConnectionManager::memory(), OpenMode::Memory),
        };

        let mut builder = Pool::<SqliteConnectionManager>::builder()
            .max_size(config.effective_max_connections())
            .connection_timeout(config.acquire_timeout.max(MIN_ACQUIRE_TIMEOUT))
            .test_on_check_out(true)
            .connection_customizer(Box::new(ConnectionBootstrap {
                mode,
                busy_timeout: config.busy_timeout,
            }));
        if mode == OpenMode::Memory {
            builder = builder.idle_timeout(None).max_lifetime(None);
        }

        let inner = builder.build(manager)?;
        info!(
            "event=pool_open module=db status=ok mode={} max_connections={}",
            mode.as_str(),
            config.effective_max_connections()
        );
        Ok(Self { config, inner })
    }

    /// Returns the configuration this pool was opened with.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Borrows one connection, waiting up to `acquire_timeout`.
    ///
    /// # Errors
    /// - `DbError::Pool` when no connection could be handed out in time.
    pub fn acquire(&self) -> DbResult<PooledConnection> {
        self.inner.get().map_err(|err| {
            let state = self.inner.state();
            warn!(
                "event=pool_acquire module=db status=timeout connections={} idle={} waited_ms={}",
                state.connections,
                state.idle_connections,
                self.config.acquire_timeout.as_millis()
            );
            DbError::Pool(err)
        })
    }

    /// Reports whether the store answers a trivial query.
    ///
    /// Never fails; any acquisition or query error reads as unhealthy.
    pub fn check_connection(&self) -> bool {
        let healthy = match self.acquire() {
            Ok(conn) => matches!(
                conn.query_row("SELECT 1;", [], |row| row.get::<_, i64>(0)),
                Ok(1)
            ),
            Err(_) => false,
        };

        if !healthy {
            warn!("event=db_health module=db status=error");
        }
        healthy
    }
}

#[cfg(test)]
mod tests {
    use super::{startup, ConnectionPool};
    use crate::config::StoreConfig;
    use crate::db::migrations::latest_version;
    use crate::db::DbError;
    use crate::repo::post_repo::{PostRepository, RepoError, SqlitePostRepository};
    use rusqlite::Connection;
    use std::time::Duration;

    #[test]
    fn connection_returns_to_pool_on_drop() {
        let pool = ConnectionPool::open(StoreConfig::in_memory()).unwrap();
        {
            let conn = pool.acquire().unwrap();
            conn.execute_batch(
                "INSERT INTO posts (owner_id, image_url, created_at, updated_at)
                 VALUES ('a', 'u', '2020-01-01T00:00:00.000', '2020-01-01T00:00:00.000');",
            )
            .unwrap();
        }
        let again = pool.acquire().unwrap();
        assert_eq!(
            again
                .query_row("SELECT COUNT(*) FROM posts;", [], |row| row.get::<_, i64>(0))
                .unwrap(),
            1
        );
    }

    #[test]
    fn acquire_times_out_when_every_connection_is_busy() {
        let mut config = StoreConfig::in_memory();
        config.acquire_timeout = Duration::from_millis(20);
        let pool = ConnectionPool::open(config).unwrap();

        let _held = pool.acquire().unwrap();
        let err = pool.acquire().unwrap_err();
        assert!(matches!(err, DbError::Pool(_)));
    }

    #[test]
    fn exhausted_pool_surfaces_as_storage_unavailable() {
        let mut config = StoreConfig::in_memory();
        config.acquire_timeout = Duration::from_millis(20);
        let pool = ConnectionPool::open(config).unwrap();
        let repo = SqlitePostRepository::new(&pool);

        let _held = pool.acquire().unwrap();
        let err = repo.get_by_id(1).unwrap_err();
        assert!(matches!(err, RepoError::StorageUnavailable(DbError::Pool(_))));
        assert_eq!(err.code(), "storage_unavailable");
    }

    #[test]
    fn every_file_connection_is_bootstrapped() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::file(dir.path().join("pinboard.sqlite3")).with_max_connections(2);
        let pool = ConnectionPool::open(config).unwrap();

        let first = pool.acquire().unwrap();
        let second = pool.acquire().unwrap();
        for conn in [&first, &second] {
            let journal_mode: String = conn
                .query_row("PRAGMA journal_mode;", [], |row| row.get(0))
                .unwrap();
            let busy_timeout_ms: i64 = conn
                .query_row("PRAGMA busy_timeout;", [], |row| row.get(0))
                .unwrap();
            let version: u32 = conn
                .query_row("PRAGMA user_version;", [], |row| row.get(0))
                .unwrap();
            assert_eq!(journal_mode.to_ascii_lowercase(), "wal");
            assert_eq!(busy_timeout_ms, 5_000);
            assert_eq!(version, latest_version());
        }
    }

    #[test]
    fn newer_schema_fails_startup_with_typed_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pinboard.sqlite3");
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch("PRAGMA user_version = 999;").unwrap();
        }

        let err = startup(StoreConfig::file(&path)).unwrap_err();
        assert!(matches!(
            err,
            DbError::UnsupportedSchemaVersion {
                db_version: 999,
                ..
            }
        ));
    }

    #[test]
    fn startup_seeds_once_and_reports_healthy() {
        let pool = startup(StoreConfig::in_memory()).unwrap();
        assert!(pool.check_connection());

        let conn = pool.acquire().unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM posts;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 8);
    }
}
