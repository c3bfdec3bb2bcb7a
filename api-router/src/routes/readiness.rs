use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::api_state::ApiState;

/// Readiness probe: the service can always serve requests; the check map
/// reports whether a vector index has been built yet.
pub async fn ready(State(state): State<ApiState>) -> impl IntoResponse {
    let index = if state.index_store.exists().await {
        "present"
    } else {
        "absent"
    };

    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "checks": { "index": index }
        })),
    )
}
