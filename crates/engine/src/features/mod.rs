//! Feature engineering for the prediction models
//!
//! Two parallel pipelines share one pattern: derive a fixed-width numeric
//! vector from structured history, with a documented, versioned feature
//! order. The published name lists ARE the contract with the model
//! registry — changing a list means re-declaring the model's input width.

pub mod equipment;
pub mod synthetic;
pub mod workforce;

pub use equipment::{snapshot_features, training_rows, EQUIPMENT_FEATURES};
pub use synthetic::SyntheticGenerator;
pub use workforce::{
    assignment_features, forecast_features, schedule_features, skill_match, ASSIGNMENT_FEATURES,
    FORECAST_FEATURES, SCHEDULE_FEATURES,
};

use chrono::{Datelike, NaiveDate};

/// Month position in the year mapped to [0, 1].
pub(crate) fn season_index(date: NaiveDate) -> f32 {
    (date.month0() as f32) / 11.0
}

/// Whole months between two dates, never negative.
pub(crate) fn months_between(from: NaiveDate, to: NaiveDate) -> f32 {
    let months =
        (to.year() - from.year()) * 12 + (to.month() as i32 - from.month() as i32);
    months.max(0) as f32
}

/// Replaces non-finite values with zero so every produced vector honors the
/// finiteness contract.
pub(crate) fn sanitize(mut row: Vec<f32>) -> Vec<f32> {
    for v in row.iter_mut() {
        if !v.is_finite() {
            *v = 0.0;
        }
    }
    row
}
