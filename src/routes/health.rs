use axum::extract::State;
use axum::routing::get;
use axum::Router;
use http::StatusCode;
use tracing::{error, info};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(health))
}

/// Liveness plus a store ping so a dead store shows up as 503.
async fn health(State(state): State<AppState>) -> (StatusCode, &'static str) {
    info!("GET /health - Health check");
    match state.store.ping().await {
        Ok(_) => (StatusCode::OK, "OK"),
        Err(e) => {
            error!("Health check could not reach the record store: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "store unavailable")
        }
    }
}
