use async_openai::{
    error::OpenAIError,
    types::{
        ChatCompletionRequestSystemMessage, ChatCompletionRequestUserMessage,
        CreateChatCompletionRequest, CreateChatCompletionRequestArgs, CreateChatCompletionResponse,
        ResponseFormat, ResponseFormatJsonSchema,
    },
};
use serde::Deserialize;
use serde_json::Value;

use common::error::AppError;

use crate::answer_retrieval_helper::{get_query_response_schema, QUERY_SYSTEM_PROMPT};
use crate::RetrievedChunk;

/// Sampling temperature for answer generation.
pub const ANSWER_TEMPERATURE: f32 = 0.9;
/// Cap on generated answer length, in tokens.
pub const ANSWER_MAX_TOKENS: u32 = 500;

#[derive(Debug, Deserialize)]
pub struct LLMResponseFormat {
    pub answer: String,
    pub sources: String,
}

/// Final answer returned to the API layer.
#[derive(Debug)]
pub struct Answer {
    pub content: String,
    pub sources: String,
}

/// Convert retrieved chunks to JSON format for the LLM context
pub fn chunks_to_chat_context(chunks: &[RetrievedChunk]) -> Value {
    fn round_score(value: f32) -> f64 {
        (f64::from(value) * 1000.0).round() / 1000.0
    }

    serde_json::json!(chunks
        .iter()
        .map(|chunk| {
            serde_json::json!({
                "source_url": chunk.chunk.source_url,
                "content": chunk.chunk.text,
                "score": round_score(chunk.score),
            })
        })
        .collect::<Vec<_>>())
}

pub fn create_user_message(context_json: &Value, query: &str) -> String {
    format!(
        r"
        Article Excerpts:
        ==================
        {context_json}

        User Question:
        ==================
        {query}
        "
    )
}

pub fn create_chat_request(
    user_message: String,
    model: &str,
) -> Result<CreateChatCompletionRequest, OpenAIError> {
    let response_format = ResponseFormat::JsonSchema {
        json_schema: ResponseFormatJsonSchema {
            description: Some("Question answering over indexed articles".into()),
            name: "answer_with_sources".into(),
            schema: Some(get_query_response_schema()),
            strict: Some(true),
        },
    };

    CreateChatCompletionRequestArgs::default()
        .model(model)
        .temperature(ANSWER_TEMPERATURE)
        .max_tokens(ANSWER_MAX_TOKENS)
        .messages([
            ChatCompletionRequestSystemMessage::from(QUERY_SYSTEM_PROMPT).into(),
            ChatCompletionRequestUserMessage::from(user_message).into(),
        ])
        .response_format(response_format)
        .build()
}

pub fn process_llm_response(
    response: CreateChatCompletionResponse,
) -> Result<LLMResponseFormat, AppError> {
    response
        .choices
        .first()
        .and_then(|choice| choice.message.content.as_ref())
        .ok_or(AppError::LLMParsing(
            "No content found in LLM response".into(),
        ))
        .and_then(|content| {
            serde_json::from_str::<LLMResponseFormat>(content).map_err(|e| {
                AppError::LLMParsing(format!("Failed to parse LLM response into an answer: {e}"))
            })
        })
}
