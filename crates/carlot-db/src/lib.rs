//! Database layer for the car registry service.
//!
//! Provides SQLite connection pooling (via `r2d2`), the destructive startup
//! bootstrap that recreates the `cars` table and seeds it, and the scoped
//! unit of work every request runs its statements in.
//!
//! # Design decisions
//!
//! - **SQLite with WAL mode**: no external database process is needed, and
//!   WAL lets readers proceed while a single writer commits.
//! - **`r2d2` connection pool**: built once at startup and handed to every
//!   handler; a checked-out connection returns to the pool when dropped.
//! - **Embedded schema**: the table definition is compiled into the binary
//!   via `include_str!`, so the schema cannot drift from the code using it.

mod bootstrap;
mod pool;
mod session;

pub use bootstrap::{bootstrap, reset_schema, seed, BootstrapError, SeedCar, SEED_CARS};
pub use pool::{create_pool, DbPool, DbRuntimeSettings, PoolError};
pub use session::{unit_of_work, SessionError};
