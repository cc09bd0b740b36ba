use tracing::info;

use crate::models::PredictionResponse;
use crate::services::action_classifier::classify;
use crate::services::forecasting_service::forecast_season;
use crate::services::season_aggregator::aggregate_season;
use crate::store::{RecordStore, StoreError};

/// Forecast every medicine with history in `season` and attach a restock action.
///
/// A season without records is a normal outcome and comes back with notes
/// instead of actions.
pub async fn predict(store: &dyn RecordStore, season: &str) -> Result<PredictionResponse, StoreError> {
    let totals = aggregate_season(store, season).await?;

    if totals.is_empty() {
        info!("No historical data for season '{}'", season);
        return Ok(PredictionResponse::no_history());
    }

    let prediction = forecast_season(&totals);
    let actions = prediction
        .iter()
        .map(|(medicine, result)| (medicine.clone(), classify(result)))
        .collect();

    info!(
        "Forecast for season '{}' covers {} medicines",
        season,
        prediction.len()
    );

    Ok(PredictionResponse {
        prediction,
        actions: Some(actions),
        notes: None,
    })
}
