//! Startup schema reset and seed data.
//!
//! The service owns its table outright: every process start drops the
//! `cars` table, recreates it from the embedded schema, and inserts a fixed
//! set of example rows. Any data left by a previous run is discarded.

use rusqlite::{params, Connection};
use thiserror::Error;

const SCHEMA_SQL: &str = include_str!("sql/cars.sql");

/// A row inserted by [`seed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedCar {
    pub plate: &'static str,
    pub model: &'static str,
    pub total_km: i64,
}

/// The example rows every fresh database starts with.
pub const SEED_CARS: &[SeedCar] = &[
    SeedCar {
        plate: "1234ABC",
        model: "Seat Ibiza",
        total_km: 60_000,
    },
    SeedCar {
        plate: "3321GNN",
        model: "Renault Scenic",
        total_km: 131_400,
    },
    SeedCar {
        plate: "9999AQR",
        model: "Maserati",
        total_km: 4_300,
    },
];

/// Errors that can occur while bootstrapping the database.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Dropping or recreating the schema failed.
    #[error("schema reset failed: {0}")]
    Reset(rusqlite::Error),

    /// Inserting a seed row failed.
    #[error("seeding car '{plate}' failed: {source}")]
    Seed {
        /// Plate of the row that could not be inserted.
        plate: String,
        /// The underlying SQLite error.
        source: rusqlite::Error,
    },

    /// Opening or committing the bootstrap transaction failed.
    #[error("bootstrap transaction failed: {0}")]
    Transaction(rusqlite::Error),
}

/// Drops the `cars` table (if present) and recreates it empty.
///
/// # Errors
///
/// Returns `BootstrapError::Reset` if either statement batch fails.
pub fn reset_schema(conn: &Connection) -> Result<(), BootstrapError> {
    conn.execute_batch("DROP TABLE IF EXISTS cars;")
        .map_err(BootstrapError::Reset)?;
    conn.execute_batch(SCHEMA_SQL)
        .map_err(BootstrapError::Reset)?;
    tracing::info!("recreated cars table");
    Ok(())
}

/// Inserts the [`SEED_CARS`] rows, returning how many were inserted.
///
/// # Errors
///
/// Returns `BootstrapError::Seed` naming the first row that failed.
pub fn seed(conn: &Connection) -> Result<usize, BootstrapError> {
    seed_from_list(conn, SEED_CARS)
}

fn seed_from_list(conn: &Connection, cars: &[SeedCar]) -> Result<usize, BootstrapError> {
    for car in cars {
        conn.execute(
            "INSERT INTO cars (plate, model, total_km) VALUES (?1, ?2, ?3)",
            params![car.plate, car.model, car.total_km],
        )
        .map_err(|e| BootstrapError::Seed {
            plate: car.plate.to_string(),
            source: e,
        })?;
        tracing::debug!(plate = car.plate, "seeded car");
    }
    Ok(cars.len())
}

/// Resets the schema and seeds it, atomically.
///
/// Both steps run in one transaction: if seeding fails, the drop is rolled
/// back too and the database is left as it was.
///
/// # Errors
///
/// Returns `BootstrapError` if any step fails.
pub fn bootstrap(conn: &Connection) -> Result<usize, BootstrapError> {
    bootstrap_with(conn, SEED_CARS)
}

fn bootstrap_with(conn: &Connection, cars: &[SeedCar]) -> Result<usize, BootstrapError> {
    let tx = conn
        .unchecked_transaction()
        .map_err(BootstrapError::Transaction)?;

    reset_schema(&tx)?;
    let seeded = seed_from_list(&tx, cars)?;

    tx.commit().map_err(BootstrapError::Transaction)?;

    tracing::info!(count = seeded, "seeded cars table");
    Ok(seeded)
}
