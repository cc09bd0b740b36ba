use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tracing::{error, info};

use crate::errors::AppError;
use crate::models::PredictionResponse;
use crate::services::prediction_service;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_prediction))
}

#[derive(Debug, Deserialize)]
pub struct PredictionQuery {
    season: Option<String>,
}

pub async fn get_prediction(
    State(state): State<AppState>,
    Query(query): Query<PredictionQuery>,
) -> Result<Json<PredictionResponse>, AppError> {
    let season = match query.season {
        Some(season) if !season.is_empty() => season,
        _ => return Err(AppError::Validation("season query param required".into())),
    };
    info!("GET /api/prediction - Forecasting season '{}'", season);

    let response = prediction_service::predict(state.store.as_ref(), &season)
        .await
        .map_err(|e| {
            error!("Failed to forecast season '{}': {}", season, e);
            AppError::from(e)
        })?;
    Ok(Json(response))
}
