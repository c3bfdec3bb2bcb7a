pub mod answer_retrieval;
pub mod answer_retrieval_helper;

use async_openai::config::OpenAIConfig;
use tracing::{debug, instrument};

use common::{
    error::AppError,
    index::{store::IndexStore, DocumentChunk, VectorIndex},
    utils::{config::AppConfig, embedding::EmbeddingProvider},
};

use answer_retrieval::{
    chunks_to_chat_context, create_chat_request, create_user_message, process_llm_response, Answer,
};

/// A supporting chunk plus its similarity score, as handed to the prompt.
#[derive(Debug, Clone)]
pub struct RetrievedChunk {
    pub chunk: DocumentChunk,
    pub score: f32,
}

#[derive(Debug, Clone)]
pub struct AnswerOptions {
    pub model: String,
    pub top_k: usize,
}

impl AnswerOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            model: config.query_model.clone(),
            top_k: config.retrieval_top_k,
        }
    }
}

/// Top-k most similar chunks for a query embedding.
pub fn retrieve_chunks(
    index: &VectorIndex,
    query_embedding: &[f32],
    top_k: usize,
) -> Result<Vec<RetrievedChunk>, AppError> {
    let hits = index.search(query_embedding, top_k)?;
    Ok(hits
        .into_iter()
        .map(|hit| RetrievedChunk {
            chunk: hit.chunk,
            score: hit.score,
        })
        .collect())
}

/// Orchestrates the query flow: load the persisted index, embed the question,
/// retrieve the most relevant chunks and generate an answer with sources.
///
/// The index is reloaded from disk on every call.
#[instrument(skip_all)]
pub async fn get_answer_with_sources(
    openai_client: &async_openai::Client<OpenAIConfig>,
    embedding_provider: &EmbeddingProvider,
    store: &IndexStore,
    question: &str,
    options: &AnswerOptions,
) -> Result<Answer, AppError> {
    let (manifest, index) = store.load().await?;

    let query_embedding = embedding_provider.embed(question).await?;
    if query_embedding.len() != index.dimension() {
        return Err(AppError::Processing(format!(
            "question embedding dimension {} does not match the persisted index ({} built with the {} backend); re-run ingestion",
            query_embedding.len(),
            index.dimension(),
            manifest.embedding_backend
        )));
    }

    let retrieved = retrieve_chunks(&index, &query_embedding, options.top_k)?;
    debug!(retrieved = retrieved.len(), "Retrieved context chunks");

    let context_json = chunks_to_chat_context(&retrieved);
    let user_message = create_user_message(&context_json, question);

    let request = create_chat_request(user_message, &options.model)?;
    let response = openai_client.chat().create(request).await?;

    let llm_response = process_llm_response(response)?;

    Ok(Answer {
        content: llm_response.answer,
        sources: llm_response.sources,
    })
}
