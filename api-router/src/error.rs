use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::error::AppError;
use serde::Serialize;
use thiserror::Error;

/// API-facing error shape: client errors map to 400, everything else is
/// collapsed into a 500 carrying the stringified underlying error.
#[derive(Error, Debug, Clone)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    InternalError(String),
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::NotFound(msg) | AppError::Validation(msg) => Self::BadRequest(msg),
            other => {
                tracing::error!("Internal error: {:?}", other);
                Self::InternalError(other.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            Self::InternalError(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        (status, Json(ErrorResponse { detail })).into_response()
    }
}

#[derive(Serialize, Debug)]
struct ErrorResponse {
    detail: String,
}
