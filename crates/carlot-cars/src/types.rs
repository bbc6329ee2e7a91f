//! Wire and storage types for the car entity.

use serde::{Deserialize, Serialize};

/// Maximum length of [`Car::model`], in characters.
pub const MAX_MODEL_LEN: usize = 50;

/// A stored car.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Car {
    /// License plate. Primary key, never changes once stored.
    pub plate: String,
    /// Descriptive model name, at most [`MAX_MODEL_LEN`] characters.
    pub model: String,
    /// Cumulative mileage in kilometres. Always positive.
    pub total_km: i64,
}

/// Body of `POST /cars` and `PUT /cars`.
///
/// `plate` may be left out on the wire, in which case it deserializes to
/// `None` and validation rejects the body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewCar {
    #[serde(default)]
    pub plate: Option<String>,
    pub model: String,
    pub total_km: i64,
}

/// Body of `PATCH /cars/{plate}`. Only fields that are `Some` get applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CarPatch {
    /// Must match the plate in the path when present.
    #[serde(default)]
    pub plate: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub total_km: Option<i64>,
}

impl CarPatch {
    /// Returns `true` when the patch would not change any column.
    pub fn is_empty(&self) -> bool {
        self.model.is_none() && self.total_km.is_none()
    }
}
