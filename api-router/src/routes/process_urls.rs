use axum::{extract::State, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use ingestion_pipeline::ingest_urls;

use crate::{api_state::ApiState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct ProcessUrlsRequest {
    pub urls: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ProcessUrlsResponse {
    pub message: String,
    pub documents_count: usize,
}

/// Fetches the submitted URLs, rebuilds the vector index over their text and
/// replaces the persisted one. Destructive: the previous index is gone once
/// this succeeds.
pub async fn process_urls(
    State(state): State<ApiState>,
    Json(request): Json<ProcessUrlsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    info!(
        url_count = request.urls.len(),
        "Received URL processing request"
    );

    let report = ingest_urls(state.ingestion.as_ref(), &state.index_store, &request.urls).await?;

    Ok(Json(ProcessUrlsResponse {
        message: "Vector index built successfully.".to_string(),
        documents_count: report.chunk_count,
    }))
}
