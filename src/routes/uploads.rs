use axum::body::Bytes;
use axum::extract::{FromRequest, Multipart, Request, State};
use axum::routing::post;
use axum::{Json, Router};
use http::header::CONTENT_TYPE;
use tracing::{error, info};

use crate::errors::AppError;
use crate::models::IngestResult;
use crate::services::batch_ingest_service::{self, IngestError, RawBatch};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(upload))
}

/// Accepts either a multipart CSV upload in the `file` field or a JSON array body.
pub async fn upload(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<IngestResult>, AppError> {
    let is_multipart = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.starts_with("multipart/form-data"))
        .unwrap_or(false);

    let result = if is_multipart {
        info!("POST /api/upload - Ingesting CSV file");
        let multipart = Multipart::from_request(request, &state)
            .await
            .map_err(|e| IngestError::BatchParse(e.body_text()))?;
        let data = read_file_field(multipart).await?;
        batch_ingest_service::ingest(state.store.as_ref(), RawBatch::Csv(&data)).await
    } else {
        info!("POST /api/upload - Ingesting JSON records");
        let body = axum::body::to_bytes(request.into_body(), state.max_upload_bytes)
            .await
            .map_err(|e| IngestError::BatchParse(e.to_string()))?;
        batch_ingest_service::ingest(state.store.as_ref(), RawBatch::Json(&body)).await
    };

    let result = result.map_err(|e| {
        error!("Upload rejected: {}", e);
        e
    })?;

    info!(
        "Upload completed: {} inserted, {} errors",
        result.inserted,
        result.errors.len()
    );
    Ok(Json(result))
}

async fn read_file_field(mut multipart: Multipart) -> Result<Bytes, IngestError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| IngestError::BatchParse(e.body_text()))?
    {
        if field.name() == Some("file") {
            return field
                .bytes()
                .await
                .map_err(|e| IngestError::BatchParse(e.body_text()));
        }
    }

    Err(IngestError::BatchParse(
        "multipart upload has no 'file' field".into(),
    ))
}
