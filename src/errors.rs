use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::services::batch_ingest_service::IngestError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    BatchParse(String),
    #[error("{0}")]
    Schema(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Validation(msg) | AppError::BatchParse(msg) | AppError::Schema(msg) => {
                (StatusCode::BAD_REQUEST, msg)
            }
            AppError::Store(e) => {
                error!("Store failure: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_string())
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<IngestError> for AppError {
    fn from(value: IngestError) -> Self {
        match value {
            IngestError::BatchParse(_) => AppError::BatchParse(value.to_string()),
            IngestError::Schema { .. } => AppError::Schema(value.to_string()),
            IngestError::Store(e) => AppError::Store(e),
        }
    }
}
