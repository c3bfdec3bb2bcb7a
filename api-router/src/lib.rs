use api_state::ApiState;
use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};

use common::error::AppError;
use routes::{
    ask_question::ask_question, liveness::live, process_urls::process_urls, readiness::ready,
};

pub mod api_state;
pub mod error;
mod routes;

/// Builds the service router: the two research endpoints plus probe routes,
/// with cross-origin access restricted to the configured frontend origin.
pub fn api_router(state: ApiState) -> Result<Router, AppError> {
    let cors = cors_layer(&state.config.frontend_origin)?;

    Ok(Router::new()
        .route("/process-urls", post(process_urls))
        .route("/ask-question", post(ask_question))
        .route("/live", get(live))
        .route("/ready", get(ready))
        .layer(cors)
        .with_state(state))
}

// Credentials are allowed, so methods and headers must be mirrored rather
// than wildcarded.
fn cors_layer(frontend_origin: &str) -> Result<CorsLayer, AppError> {
    let origin = frontend_origin.parse::<HeaderValue>().map_err(|_| {
        AppError::Validation(format!("invalid frontend_origin: {frontend_origin}"))
    })?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true))
}
