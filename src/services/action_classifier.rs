use crate::models::{Action, ForecastResult};

pub const INCREASE_THRESHOLD: f64 = 1.05;
pub const DECREASE_THRESHOLD: f64 = 0.95;

/// Restock recommendation from a forecast.
///
/// Only strictly more than 5% above the last total is an increase and only
/// strictly more than 5% below is a decrease; both boundaries hold.
pub fn classify(result: &ForecastResult) -> Action {
    classify_values(result.predicted_quantity, result.last_total)
}

pub fn classify_values(predicted: f64, last_total: f64) -> Action {
    if predicted > last_total * INCREASE_THRESHOLD {
        Action::Increase
    } else if predicted < last_total * DECREASE_THRESHOLD {
        Action::Decrease
    } else {
        Action::Hold
    }
}
