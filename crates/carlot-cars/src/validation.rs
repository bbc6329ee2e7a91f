//! Field rules checked before any car body reaches the database.
//!
//! Each function collects every violation instead of stopping at the first,
//! so a client fixing a rejected body sees all of its problems at once.

use crate::types::{Car, CarPatch, NewCar, MAX_MODEL_LEN};
use serde::Serialize;

/// A single broken field rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    /// Wire name of the offending field.
    pub field: &'static str,
    /// Human-readable description of the rule.
    pub message: String,
}

/// One or more field rules broken by a request body.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid car: {}", describe(.violations))]
pub struct ValidationError {
    pub violations: Vec<FieldViolation>,
}

fn describe(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| format!("{} {}", v.field, v.message))
        .collect::<Vec<_>>()
        .join("; ")
}

fn finish(violations: Vec<FieldViolation>) -> Result<(), ValidationError> {
    if violations.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { violations })
    }
}

fn check_model(model: &str, violations: &mut Vec<FieldViolation>) {
    if model.chars().count() > MAX_MODEL_LEN {
        violations.push(FieldViolation {
            field: "model",
            message: format!("must be at most {} characters", MAX_MODEL_LEN),
        });
    }
}

fn check_total_km(total_km: i64, violations: &mut Vec<FieldViolation>) {
    if total_km <= 0 {
        violations.push(FieldViolation {
            field: "total_km",
            message: "must be greater than 0".to_string(),
        });
    }
}

/// Validates a create/replace body and turns it into a storable [`Car`].
///
/// # Errors
///
/// Returns a [`ValidationError`] listing every rule the body breaks:
/// a missing or blank plate, an over-long model, or non-positive mileage.
pub fn validate_new_car(car: &NewCar) -> Result<Car, ValidationError> {
    let mut violations = Vec::new();

    // Stored exactly as sent; only an absent or all-whitespace plate fails.
    let plate = match car.plate.as_deref() {
        Some(plate) if !plate.trim().is_empty() => Some(plate.to_string()),
        _ => {
            violations.push(FieldViolation {
                field: "plate",
                message: "is required".to_string(),
            });
            None
        }
    };
    check_model(&car.model, &mut violations);
    check_total_km(car.total_km, &mut violations);

    finish(violations)?;

    Ok(Car {
        plate: plate.unwrap_or_default(),
        model: car.model.clone(),
        total_km: car.total_km,
    })
}

/// Validates a partial update addressed to `plate`.
///
/// # Errors
///
/// Returns a [`ValidationError`] if a present field breaks its rule or the
/// body tries to change the plate.
pub fn validate_patch(plate: &str, patch: &CarPatch) -> Result<(), ValidationError> {
    let mut violations = Vec::new();

    if let Some(body_plate) = &patch.plate {
        if body_plate != plate {
            violations.push(FieldViolation {
                field: "plate",
                message: "cannot be changed".to_string(),
            });
        }
    }
    if let Some(model) = &patch.model {
        check_model(model, &mut violations);
    }
    if let Some(total_km) = patch.total_km {
        check_total_km(total_km, &mut violations);
    }

    finish(violations)
}
