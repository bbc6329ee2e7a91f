//! Handlers for the `/cars` endpoints.
//!
//! "Newest" throughout means the car with the fewest kilometres, not the
//! most recently registered one. The in-memory and SQL variants of each
//! aggregate are kept as separate endpoints and intentionally differ on an
//! empty table.

use crate::api::{with_unit_of_work, ApiError};
use crate::AppState;
use axum::extract::{rejection::JsonRejection, Extension, Json, Path};
use carlot_cars::{
    average_km, average_km_sql, create_car, delete_car, format_average, get_car, list_cars,
    newest_car, newest_car_sql, patch_car, replace_car, validate_new_car, validate_patch, Car,
    CarPatch, NewCar,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Response body for `GET /cars/average`.
#[derive(Debug, Serialize, Deserialize)]
pub struct AverageResponse {
    /// Mean mileage rendered with two decimals.
    pub average_km: String,
}

/// Response body for `GET /cars/average-sql`.
#[derive(Debug, Serialize, Deserialize)]
pub struct AverageSqlResponse {
    /// Mean mileage as computed by SQLite; `null` on an empty table.
    pub average_km: Option<f64>,
}

/// Response body for `DELETE /cars/{plate}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub message: String,
}

/// GET /cars
pub async fn list_cars_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Vec<Car>>, ApiError> {
    let cars = with_unit_of_work(&state, |tx| Ok(list_cars(tx)?)).await?;
    Ok(Json(cars))
}

/// GET /cars/average
///
/// Fetches every row and averages in memory. An empty table is a server
/// error, unlike `/cars/average-sql`.
pub async fn average_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<AverageResponse>, ApiError> {
    let cars = with_unit_of_work(&state, |tx| Ok(list_cars(tx)?)).await?;
    let average = average_km(&cars)?;
    Ok(Json(AverageResponse {
        average_km: format_average(average),
    }))
}

/// GET /cars/average-sql
pub async fn average_sql_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<AverageSqlResponse>, ApiError> {
    let average = with_unit_of_work(&state, |tx| Ok(average_km_sql(tx)?)).await?;
    Ok(Json(AverageSqlResponse {
        average_km: average,
    }))
}

/// GET /cars/newest
///
/// Single pass over all rows keeping the lowest `total_km`; ties go to the
/// first row returned by storage. Responds `null` on an empty table.
pub async fn newest_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Option<Car>>, ApiError> {
    let cars = with_unit_of_work(&state, |tx| Ok(list_cars(tx)?)).await?;
    Ok(Json(newest_car(&cars).cloned()))
}

/// GET /cars/newest-sql
pub async fn newest_sql_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Option<Car>>, ApiError> {
    let car = with_unit_of_work(&state, |tx| Ok(newest_car_sql(tx)?)).await?;
    Ok(Json(car))
}

/// GET /cars/{plate}
pub async fn get_car_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(plate): Path<String>,
) -> Result<Json<Car>, ApiError> {
    let car = with_unit_of_work(&state, move |tx| Ok(get_car(tx, &plate)?)).await?;
    Ok(Json(car))
}

/// POST /cars
pub async fn create_car_handler(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<NewCar>, JsonRejection>,
) -> Result<Json<Car>, ApiError> {
    let Json(payload) = payload?;
    let car = validate_new_car(&payload)?;

    let created = with_unit_of_work(&state, move |tx| Ok(create_car(tx, &car)?)).await?;
    tracing::info!(plate = %created.plate, "created car");
    Ok(Json(created))
}

/// PATCH /cars/{plate}
pub async fn patch_car_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(plate): Path<String>,
    payload: Result<Json<CarPatch>, JsonRejection>,
) -> Result<Json<Car>, ApiError> {
    let Json(patch) = payload?;
    validate_patch(&plate, &patch)?;

    let updated = with_unit_of_work(&state, move |tx| Ok(patch_car(tx, &plate, &patch)?)).await?;
    tracing::info!(plate = %updated.plate, "patched car");
    Ok(Json(updated))
}

/// PUT /cars
///
/// Keyed by the plate inside the body; there is no path parameter.
pub async fn replace_car_handler(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<NewCar>, JsonRejection>,
) -> Result<Json<Car>, ApiError> {
    let Json(payload) = payload?;
    let car = validate_new_car(&payload)?;

    let replaced = with_unit_of_work(&state, move |tx| Ok(replace_car(tx, &car)?)).await?;
    tracing::info!(plate = %replaced.plate, "replaced car");
    Ok(Json(replaced))
}

/// DELETE /cars/{plate}
pub async fn delete_car_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(plate): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let deleted = plate.clone();
    with_unit_of_work(&state, move |tx| Ok(delete_car(tx, &plate)?)).await?;
    tracing::info!(plate = %deleted, "deleted car");
    Ok(Json(DeleteResponse {
        message: "car deleted".to_string(),
    }))
}
