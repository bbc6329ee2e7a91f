//! The r2d2 pool in front of the car database file.

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, OpenFlags};
use std::time::Duration;
use thiserror::Error;

/// Knobs applied to every pooled connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DbRuntimeSettings {
    /// SQLite busy timeout in milliseconds. The pool checkout wait uses the
    /// same value, raised to at least one second.
    pub busy_timeout_ms: u64,
    pub pool_max_size: u32,
}

impl Default for DbRuntimeSettings {
    fn default() -> Self {
        Self {
            busy_timeout_ms: 5_000,
            pool_max_size: 8,
        }
    }
}

/// Pooled SQLite connections shared by every request handler.
pub type DbPool = Pool<SqliteConnectionManager>;

/// Failure to open the car database.
#[derive(Debug, Error)]
pub enum PoolError {
    /// r2d2 could not open the initial connections.
    #[error("cannot open car database: {0}")]
    PoolInit(#[from] r2d2::Error),
}

/// Journal modes a freshly opened connection may report. `:memory:`
/// databases cannot use WAL and answer "memory".
const ACCEPTED_JOURNAL_MODES: [&str; 2] = ["wal", "memory"];

/// Per-connection setup run by the pool each time it opens a connection.
fn configure_connection(conn: &mut Connection, busy_timeout_ms: u64) -> rusqlite::Result<()> {
    let journal_mode: String =
        conn.query_row("PRAGMA journal_mode = WAL;", [], |row| row.get(0))?;
    if !ACCEPTED_JOURNAL_MODES.contains(&journal_mode.as_str()) {
        return Err(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_ERROR),
            Some(format!("car database refused WAL, journal mode is {journal_mode}")),
        ));
    }
    conn.pragma_update(None, "foreign_keys", true)?;
    conn.busy_timeout(Duration::from_millis(busy_timeout_ms))
}

/// Opens the car database at `db_path` behind an r2d2 pool.
///
/// Connections are opened eagerly, so a path that cannot be created or
/// written fails here instead of on the first request. A `:memory:` path
/// gives each connection its own database; use `pool_max_size = 1` there.
///
/// # Errors
///
/// Returns [`PoolError::PoolInit`] when the initial connections cannot be
/// opened or configured.
pub fn create_pool(db_path: &str, settings: DbRuntimeSettings) -> Result<DbPool, PoolError> {
    let manager = SqliteConnectionManager::file(db_path)
        .with_flags(
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_FULL_MUTEX,
        )
        .with_init(move |conn| configure_connection(conn, settings.busy_timeout_ms));

    let checkout_timeout = Duration::from_millis(settings.busy_timeout_ms.max(1_000));
    let pool = Pool::builder()
        .max_size(settings.pool_max_size)
        .connection_timeout(checkout_timeout)
        .build(manager)?;

    tracing::debug!(
        path = db_path,
        max_size = settings.pool_max_size,
        "car database pool ready"
    );

    Ok(pool)
}
