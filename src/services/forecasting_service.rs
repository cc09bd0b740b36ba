use std::collections::BTreeMap;

use crate::models::{ForecastResult, YearlyTotal};

/// Round to two decimals, halves away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Year-over-year growth ratio. A zero base counts as flat growth.
pub fn growth_ratio(previous: f64, current: f64) -> f64 {
    if previous == 0.0 {
        1.0
    } else {
        current / previous
    }
}

/// Project next-period demand from one medicine's year-ordered totals.
///
/// `totals` must be sorted by year ascending with one entry per year.
/// Returns `None` for an empty history.
pub fn project(totals: &[f64]) -> Option<ForecastResult> {
    let last_total = *totals.last()?;

    let predicted = if totals.len() == 1 {
        last_total
    } else {
        let ratios: Vec<f64> = totals
            .windows(2)
            .map(|pair| growth_ratio(pair[0], pair[1]))
            .collect();
        let average_ratio = ratios.iter().sum::<f64>() / ratios.len() as f64;
        last_total * average_ratio
    };

    Some(ForecastResult {
        predicted_quantity: round2(predicted),
        historical_years: totals.len(),
        last_total,
    })
}

/// One forecast per medicine present in `totals`.
///
/// Totals may arrive in any order; duplicates of the same (year, medicine)
/// are merged before projecting.
pub fn forecast_season(totals: &[YearlyTotal]) -> BTreeMap<String, ForecastResult> {
    let mut by_medicine: BTreeMap<&str, BTreeMap<i32, f64>> = BTreeMap::new();

    for t in totals {
        *by_medicine
            .entry(t.medicine.as_str())
            .or_default()
            .entry(t.year)
            .or_insert(0.0) += t.total;
    }

    by_medicine
        .into_iter()
        .filter_map(|(medicine, years)| {
            let series: Vec<f64> = years.into_values().collect();
            project(&series).map(|result| (medicine.to_string(), result))
        })
        .collect()
}
