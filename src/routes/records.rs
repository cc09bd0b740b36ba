use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tracing::{error, info};

use crate::errors::AppError;
use crate::models::Record;
use crate::services::record_service::{self, DEFAULT_PAGE, DEFAULT_PER_PAGE};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_records))
}

// Kept as text so a bad number gets our JSON error instead of the extractor's.
#[derive(Debug, Deserialize)]
pub struct PaginationParams {
    page: Option<String>,
    per_page: Option<String>,
}

fn parse_param(raw: Option<&str>, default: i64) -> Result<i64, AppError> {
    match raw {
        None => Ok(default),
        Some(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| AppError::Validation("page and per_page must be integers".into())),
    }
}

pub async fn list_records(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<Vec<Record>>, AppError> {
    let page = parse_param(params.page.as_deref(), DEFAULT_PAGE)?;
    let per_page = parse_param(params.per_page.as_deref(), DEFAULT_PER_PAGE)?;
    info!("GET /api/records - page {} ({} per page)", page, per_page);

    let records = record_service::list_records(state.store.as_ref(), page, per_page)
        .await
        .map_err(|e| {
            error!("Failed to list records: {}", e);
            e
        })?;
    Ok(Json(records))
}
