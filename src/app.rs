use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::routes::{health, predictions, records, uploads};
use crate::state::AppState;

pub fn create_app(state: AppState) -> Router {
    let upload_limit = state.max_upload_bytes;

    Router::<AppState>::new()
        .nest("/health", health::router())
        .nest(
            "/api/upload",
            uploads::router().layer(DefaultBodyLimit::max(upload_limit)),
        )
        .nest("/api/records", records::router())
        .nest("/api/prediction", predictions::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
