//! Aggregates computed in application memory over fetched rows.

use crate::error::CarError;
use crate::types::Car;

/// Arithmetic mean of `total_km` over `cars`.
///
/// The sum is accumulated in `i128`, so any number of rows at `i64::MAX`
/// averages without overflow.
///
/// # Errors
///
/// Returns [`CarError::EmptyCollection`] for an empty slice.
pub fn average_km(cars: &[Car]) -> Result<f64, CarError> {
    if cars.is_empty() {
        return Err(CarError::EmptyCollection);
    }
    let total: i128 = cars.iter().map(|car| i128::from(car.total_km)).sum();
    Ok(total as f64 / cars.len() as f64)
}

/// Renders an average with exactly two decimal places.
pub fn format_average(average: f64) -> String {
    format!("{average:.2}")
}

/// The car with the fewest kilometres, which the API calls "newest".
///
/// The current pick is replaced only by a strictly smaller mileage, so on a
/// tie the row that came first wins. Returns `None` for an empty slice.
pub fn newest_car(cars: &[Car]) -> Option<&Car> {
    let mut newest: Option<&Car> = None;
    for car in cars {
        if newest.map_or(true, |current| current.total_km > car.total_km) {
            newest = Some(car);
        }
    }
    newest
}
