use axum::{extract::State, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use retrieval_pipeline::{get_answer_with_sources, AnswerOptions};

use crate::{api_state::ApiState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct AskQuestionRequest {
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct AskQuestionResponse {
    pub answer: String,
    pub sources: String,
}

/// Answers a question against the persisted index. Fails with a client error
/// when no index has been built yet.
pub async fn ask_question(
    State(state): State<ApiState>,
    Json(request): Json<AskQuestionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    info!("Received question");

    if request.question.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "question must not be empty".to_string(),
        ));
    }

    let options = AnswerOptions::from_config(&state.config);
    let answer = get_answer_with_sources(
        &state.openai_client,
        &state.embedding_provider,
        &state.index_store,
        &request.question,
        &options,
    )
    .await?;

    Ok(Json(AskQuestionResponse {
        answer: answer.content,
        sources: answer.sources,
    }))
}
