//! SQL access to the `cars` table.
//!
//! Every function takes a borrowed connection so callers decide the
//! transaction scope; in the server that is one unit of work per request.
//! Bodies are expected to be validated already.

use crate::error::CarError;
use crate::types::{Car, CarPatch};
use rusqlite::{params, Connection, OptionalExtension, Row};

fn map_row_to_car(row: &Row<'_>) -> rusqlite::Result<Car> {
    Ok(Car {
        plate: row.get(0)?,
        model: row.get(1)?,
        total_km: row.get(2)?,
    })
}

fn is_primary_key_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _)
            if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
    )
}

/// Lists every car in storage order.
pub fn list_cars(conn: &Connection) -> Result<Vec<Car>, CarError> {
    tracing::debug!("SELECT plate, model, total_km FROM cars");
    let mut stmt = conn.prepare("SELECT plate, model, total_km FROM cars")?;

    let rows = stmt.query_map([], map_row_to_car)?;
    let mut cars = Vec::new();
    for row in rows {
        cars.push(row?);
    }
    Ok(cars)
}

/// Looks a car up by plate.
pub fn find_car(conn: &Connection, plate: &str) -> Result<Option<Car>, CarError> {
    tracing::debug!(plate, "SELECT car by plate");
    let car = conn
        .query_row(
            "SELECT plate, model, total_km FROM cars WHERE plate = ?1",
            [plate],
            map_row_to_car,
        )
        .optional()?;
    Ok(car)
}

/// Retrieves a car by plate, failing with [`CarError::NotFound`] if absent.
pub fn get_car(conn: &Connection, plate: &str) -> Result<Car, CarError> {
    find_car(conn, plate)?.ok_or_else(|| CarError::NotFound(plate.to_string()))
}

/// Inserts a new car and returns the stored row.
///
/// # Errors
///
/// Returns [`CarError::AlreadyExists`] if the plate is taken, whether that
/// is seen by the existence check or by the primary key on insert.
pub fn create_car(conn: &Connection, car: &Car) -> Result<Car, CarError> {
    if find_car(conn, &car.plate)?.is_some() {
        return Err(CarError::AlreadyExists(car.plate.clone()));
    }

    tracing::debug!(plate = %car.plate, "INSERT car");
    conn.execute(
        "INSERT INTO cars (plate, model, total_km) VALUES (?1, ?2, ?3)",
        params![car.plate, car.model, car.total_km],
    )
    .map_err(|e| {
        if is_primary_key_violation(&e) {
            CarError::AlreadyExists(car.plate.clone())
        } else {
            CarError::Database(e)
        }
    })?;

    get_car(conn, &car.plate)
}

/// Applies the `Some` fields of `patch` to the car stored under `plate`.
///
/// The plate itself is never rewritten. Returns the stored row.
pub fn patch_car(conn: &Connection, plate: &str, patch: &CarPatch) -> Result<Car, CarError> {
    let existing = get_car(conn, plate)?;
    if patch.is_empty() {
        return Ok(existing);
    }

    let mut set_parts: Vec<String> = Vec::new();
    let mut values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();
    let mut idx = 1usize;

    if let Some(model) = &patch.model {
        set_parts.push(format!("model = ?{}", idx));
        values.push(Box::new(model.clone()));
        idx += 1;
    }
    if let Some(total_km) = patch.total_km {
        set_parts.push(format!("total_km = ?{}", idx));
        values.push(Box::new(total_km));
        idx += 1;
    }
    values.push(Box::new(plate.to_string()));

    let sql = format!(
        "UPDATE cars SET {} WHERE plate = ?{}",
        set_parts.join(", "),
        idx
    );
    tracing::debug!(plate, columns = set_parts.len(), "UPDATE car (patch)");
    conn.execute(&sql, rusqlite::params_from_iter(values.iter()))?;

    get_car(conn, plate)
}

/// Overwrites every non-key column of the car stored under `car.plate`.
pub fn replace_car(conn: &Connection, car: &Car) -> Result<Car, CarError> {
    get_car(conn, &car.plate)?;

    tracing::debug!(plate = %car.plate, "UPDATE car (replace)");
    conn.execute(
        "UPDATE cars SET model = ?1, total_km = ?2 WHERE plate = ?3",
        params![car.model, car.total_km, car.plate],
    )?;

    get_car(conn, &car.plate)
}

/// Deletes the car stored under `plate`.
pub fn delete_car(conn: &Connection, plate: &str) -> Result<(), CarError> {
    get_car(conn, plate)?;

    tracing::debug!(plate, "DELETE car");
    conn.execute("DELETE FROM cars WHERE plate = ?1", [plate])?;
    Ok(())
}

/// Mean mileage computed by SQLite. `None` when the table is empty.
pub fn average_km_sql(conn: &Connection) -> Result<Option<f64>, CarError> {
    tracing::debug!("SELECT AVG(total_km) FROM cars");
    let average = conn.query_row("SELECT AVG(total_km) FROM cars", [], |row| {
        row.get::<_, Option<f64>>(0)
    })?;
    Ok(average)
}

/// The car with the fewest kilometres, picked by SQLite.
pub fn newest_car_sql(conn: &Connection) -> Result<Option<Car>, CarError> {
    tracing::debug!("SELECT car ORDER BY total_km ASC LIMIT 1");
    let car = conn
        .query_row(
            "SELECT plate, model, total_km FROM cars ORDER BY total_km ASC LIMIT 1",
            [],
            map_row_to_car,
        )
        .optional()?;
    Ok(car)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{average_km, newest_car};

    fn seeded() -> Connection {
        let conn = Connection::open_in_memory().expect("should open in-memory db");
        carlot_db::bootstrap(&conn).expect("bootstrap should succeed");
        conn
    }

    fn empty() -> Connection {
        let conn = Connection::open_in_memory().expect("should open in-memory db");
        carlot_db::reset_schema(&conn).expect("reset should succeed");
        conn
    }

    fn car(plate: &str, model: &str, total_km: i64) -> Car {
        Car {
            plate: plate.to_string(),
            model: model.to_string(),
            total_km,
        }
    }

    #[test]
    fn list_returns_seed_rows() {
        let conn = seeded();
        let cars = list_cars(&conn).unwrap();
        let mut plates: Vec<_> = cars.iter().map(|c| c.plate.as_str()).collect();
        plates.sort_unstable();
        assert_eq!(plates, vec!["1234ABC", "3321GNN", "9999AQR"]);
    }

    #[test]
    fn create_then_get_round_trips() {
        let conn = seeded();
        let new = car("5555EEE", "Toyota Yaris", 25_000);
        let stored = create_car(&conn, &new).unwrap();
        assert_eq!(stored, new);
        assert_eq!(get_car(&conn, "5555EEE").unwrap(), new);
    }

    #[test]
    fn create_duplicate_leaves_existing_row() {
        let conn = seeded();
        let err = create_car(&conn, &car("1234ABC", "Impostor", 1)).unwrap_err();
        assert!(matches!(err, CarError::AlreadyExists(ref p) if p == "1234ABC"));

        let existing = get_car(&conn, "1234ABC").unwrap();
        assert_eq!(existing.model, "Seat Ibiza");
        assert_eq!(existing.total_km, 60_000);
    }

    #[test]
    fn get_missing_is_not_found() {
        let conn = seeded();
        assert!(matches!(
            get_car(&conn, "0000XXX"),
            Err(CarError::NotFound(ref p)) if p == "0000XXX"
        ));
        assert!(find_car(&conn, "0000XXX").unwrap().is_none());
    }

    #[test]
    fn patch_leaves_unset_fields() {
        let conn = seeded();
        let patch = CarPatch {
            total_km: Some(61_000),
            ..CarPatch::default()
        };
        let updated = patch_car(&conn, "1234ABC", &patch).unwrap();
        assert_eq!(updated, car("1234ABC", "Seat Ibiza", 61_000));
    }

    #[test]
    fn empty_patch_returns_existing_row() {
        let conn = seeded();
        let unchanged = patch_car(&conn, "9999AQR", &CarPatch::default()).unwrap();
        assert_eq!(unchanged, car("9999AQR", "Maserati", 4_300));
    }

    #[test]
    fn patch_missing_is_not_found() {
        let conn = seeded();
        let patch = CarPatch {
            model: Some("Ghost".to_string()),
            ..CarPatch::default()
        };
        assert!(matches!(
            patch_car(&conn, "0000XXX", &patch),
            Err(CarError::NotFound(_))
        ));
    }

    #[test]
    fn replace_overwrites_all_columns() {
        let conn = seeded();
        let replaced = replace_car(&conn, &car("3321GNN", "Renault Megane", 140_000)).unwrap();
        assert_eq!(replaced, car("3321GNN", "Renault Megane", 140_000));
    }

    #[test]
    fn replace_missing_is_not_found() {
        let conn = seeded();
        assert!(matches!(
            replace_car(&conn, &car("0000XXX", "Ghost", 1)),
            Err(CarError::NotFound(_))
        ));
    }

    #[test]
    fn delete_then_get_is_not_found() {
        let conn = seeded();
        delete_car(&conn, "1234ABC").unwrap();
        assert!(matches!(
            get_car(&conn, "1234ABC"),
            Err(CarError::NotFound(_))
        ));
        assert!(matches!(
            delete_car(&conn, "1234ABC"),
            Err(CarError::NotFound(_))
        ));
    }

    #[test]
    fn sql_and_memory_aggregates_agree() {
        let conn = seeded();
        let cars = list_cars(&conn).unwrap();

        let in_memory = average_km(&cars).unwrap();
        let pushed_down = average_km_sql(&conn).unwrap().unwrap();
        assert!((in_memory - pushed_down).abs() < 1e-9);

        let newest = newest_car(&cars).unwrap();
        let newest_sql = newest_car_sql(&conn).unwrap().unwrap();
        assert_eq!(newest.plate, "9999AQR");
        assert_eq!(newest_sql, *newest);
    }

    #[test]
    fn sql_aggregates_on_empty_table() {
        let conn = empty();
        assert_eq!(average_km_sql(&conn).unwrap(), None);
        assert_eq!(newest_car_sql(&conn).unwrap(), None);
    }

    #[test]
    fn storage_check_rejects_unvalidated_mileage() {
        let conn = seeded();
        let err = create_car(&conn, &car("7777GGG", "Bypass", 0)).unwrap_err();
        assert!(matches!(err, CarError::Database(_)));
        assert!(find_car(&conn, "7777GGG").unwrap().is_none());
    }
}
