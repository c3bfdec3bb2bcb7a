use std::sync::Arc;

use async_trait::async_trait;
use futures::future::try_join_all;
use tracing::info;

use common::{
    error::AppError,
    index::{store::IndexStore, DocumentChunk, IndexManifest, VectorIndex},
    utils::{config::AppConfig, embedding::EmbeddingProvider},
};

use crate::{chunking::split_into_chunks, url_text_retrieval::FetchedDocument};

/// Seams the ingestion flow delegates to: document loading, chunking and
/// embedding. The orchestration in [`ingest_urls`] is written against this
/// trait so the capabilities stay swappable.
#[async_trait]
pub trait IngestionServices: Send + Sync {
    async fn fetch_document(&self, url: &str) -> Result<FetchedDocument, AppError>;

    fn split_text(&self, text: &str) -> Result<Vec<String>, AppError>;

    async fn embed_chunks(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, AppError>;

    fn embedding_backend(&self) -> &'static str;

    fn embedding_model(&self) -> Option<String>;
}

pub struct DefaultIngestionServices {
    http: reqwest::Client,
    embedding_provider: Arc<EmbeddingProvider>,
    max_chunk_chars: usize,
    allow_private_urls: bool,
}

impl DefaultIngestionServices {
    pub fn new(config: &AppConfig, embedding_provider: Arc<EmbeddingProvider>) -> Self {
        Self {
            http: reqwest::Client::new(),
            embedding_provider,
            max_chunk_chars: config.max_chunk_chars,
            allow_private_urls: config.allow_private_urls,
        }
    }
}

#[async_trait]
impl IngestionServices for DefaultIngestionServices {
    async fn fetch_document(&self, url: &str) -> Result<FetchedDocument, AppError> {
        crate::url_text_retrieval::extract_text_from_url(&self.http, url, self.allow_private_urls)
            .await
    }

    fn split_text(&self, text: &str) -> Result<Vec<String>, AppError> {
        split_into_chunks(text, self.max_chunk_chars)
    }

    async fn embed_chunks(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, AppError> {
        self.embedding_provider.embed_batch(texts).await
    }

    fn embedding_backend(&self) -> &'static str {
        self.embedding_provider.backend_label()
    }

    fn embedding_model(&self) -> Option<String> {
        self.embedding_provider.model_code()
    }
}

#[derive(Debug)]
pub struct IngestionReport {
    pub url_count: usize,
    pub chunk_count: usize,
}

/// Runs the full ingestion flow: fetch every URL, chunk the extracted text,
/// embed every chunk, build a fresh index and persist it over the previous
/// one. Any single failure aborts the whole request; the previously persisted
/// index is left in place.
pub async fn ingest_urls(
    services: &dyn IngestionServices,
    store: &IndexStore,
    urls: &[String],
) -> Result<IngestionReport, AppError> {
    if urls.is_empty() {
        return Err(AppError::Validation(
            "urls must contain at least one entry".to_string(),
        ));
    }

    let documents =
        try_join_all(urls.iter().map(|url| services.fetch_document(url))).await?;

    let mut chunks: Vec<DocumentChunk> = Vec::new();
    for document in &documents {
        for piece in services.split_text(&document.text)? {
            chunks.push(DocumentChunk::new(document.url.clone(), piece));
        }
    }

    if chunks.is_empty() {
        return Err(AppError::Processing(
            "no text could be extracted from the submitted urls".to_string(),
        ));
    }

    let texts: Vec<String> = chunks.iter().map(|chunk| chunk.text.clone()).collect();
    let embeddings = services.embed_chunks(texts).await?;

    let index = VectorIndex::build(chunks, embeddings)?;
    let manifest = IndexManifest::new(
        &index,
        services.embedding_backend(),
        services.embedding_model(),
    );
    store.save(&index, &manifest).await?;

    info!(
        url_count = urls.len(),
        chunk_count = index.len(),
        "Ingestion completed"
    );

    Ok(IngestionReport {
        url_count: urls.len(),
        chunk_count: index.len(),
    })
}
