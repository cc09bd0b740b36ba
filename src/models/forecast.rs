use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::BTreeMap;

/// Sum of quantities for one medicine in one calendar year of a season.
///
/// `total` is a float: a year of valid quantities can exceed `i64::MAX`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct YearlyTotal {
    pub year: i32,
    pub medicine: String,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub predicted_quantity: f64,
    pub historical_years: usize,
    pub last_total: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Increase,
    Decrease,
    Hold,
}

pub const NO_HISTORY_NOTE: &str = "no historical data for that season";

/// Body of the prediction endpoint.
///
/// `actions` is present when at least one medicine was forecast,
/// `notes` when the season had no history at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub prediction: BTreeMap<String, ForecastResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actions: Option<BTreeMap<String, Action>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl PredictionResponse {
    pub fn no_history() -> Self {
        Self {
            prediction: BTreeMap::new(),
            actions: None,
            notes: Some(NO_HISTORY_NOTE.to_string()),
        }
    }
}
