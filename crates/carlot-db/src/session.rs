//! Scoped unit of work over a pooled connection.

use crate::DbPool;
use rusqlite::Transaction;
use thiserror::Error;

/// Errors raised while acquiring or finishing a unit of work.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No connection could be checked out of the pool.
    #[error("failed to acquire database connection: {0}")]
    Pool(#[from] r2d2::Error),

    /// Beginning or committing the transaction failed.
    #[error("database transaction failed: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Runs `work` inside a transaction on a connection checked out of `pool`.
///
/// The transaction commits only when `work` returns `Ok`. Any `Err` (or a
/// panic unwinding through here) drops the transaction, which rolls it back,
/// and then drops the pooled connection, which returns it to the pool.
///
/// This call blocks; async callers run it on `tokio::task::spawn_blocking`.
///
/// # Errors
///
/// Returns whatever `work` returns, or a [`SessionError`] converted into `E`
/// when the connection cannot be acquired or the transaction cannot begin
/// or commit.
pub fn unit_of_work<T, E, F>(pool: &DbPool, work: F) -> Result<T, E>
where
    F: FnOnce(&Transaction<'_>) -> Result<T, E>,
    E: From<SessionError>,
{
    let mut conn = pool.get().map_err(SessionError::Pool)?;
    let tx = conn.transaction().map_err(SessionError::Database)?;

    let value = work(&tx)?;

    tx.commit().map_err(SessionError::Database)?;
    Ok(value)
}
