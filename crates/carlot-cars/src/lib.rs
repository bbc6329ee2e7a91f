//! The car entity and everything that reads or writes it.
//!
//! A car is keyed by its license plate and carries a model name and its
//! cumulative mileage. This crate defines the wire/storage types, the
//! validation run on every client-supplied body before it reaches SQLite,
//! the repository functions issuing one statement per operation, and the
//! in-memory aggregates that mirror the SQL ones.
//!
//! # Core types
//!
//! - [`Car`]: a stored row, also the response body
//! - [`NewCar`]: body of a create or full replace
//! - [`CarPatch`]: body of a partial update
//!
//! # In-memory vs. pushdown aggregates
//!
//! The average and "newest" computations exist twice: once over rows
//! fetched into memory ([`average_km`], [`newest_car`]) and once inside the
//! database ([`average_km_sql`], [`newest_car_sql`]). They agree on any
//! non-empty table but differ on an empty one: the in-memory average fails
//! with [`CarError::EmptyCollection`] while the SQL average is `None`.

pub mod error;
pub mod repository;
pub mod stats;
pub mod types;
pub mod validation;

pub use error::CarError;
pub use repository::{
    average_km_sql, create_car, delete_car, find_car, get_car, list_cars, newest_car_sql,
    patch_car, replace_car,
};
pub use stats::{average_km, format_average, newest_car};
pub use types::{Car, CarPatch, NewCar, MAX_MODEL_LEN};
pub use validation::{validate_new_car, validate_patch, FieldViolation, ValidationError};
