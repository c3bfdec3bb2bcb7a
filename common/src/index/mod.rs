pub mod store;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// On-disk format version, bumped on incompatible layout changes.
pub const INDEX_FORMAT_VERSION: u32 = 1;

/// A bounded-size fragment of article text plus its originating URL. The unit
/// that is embedded, indexed and retrieved.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentChunk {
    pub id: String,
    pub source_url: String,
    pub text: String,
}

impl DocumentChunk {
    pub fn new(source_url: String, text: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            source_url,
            text,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexEntry {
    pub chunk: DocumentChunk,
    pub embedding: Vec<f32>,
}

/// A chunk returned from similarity search together with its cosine score.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub chunk: DocumentChunk,
    pub score: f32,
}

/// Sidecar metadata persisted next to the index payload. Plain serde data,
/// safe to deserialize regardless of where the directory came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexManifest {
    pub format_version: u32,
    pub chunk_count: usize,
    pub dimension: usize,
    pub embedding_backend: String,
    pub embedding_model: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl IndexManifest {
    pub fn new(index: &VectorIndex, backend: &str, model: Option<String>) -> Self {
        Self {
            format_version: INDEX_FORMAT_VERSION,
            chunk_count: index.len(),
            dimension: index.dimension(),
            embedding_backend: backend.to_string(),
            embedding_model: model,
            created_at: Utc::now(),
        }
    }
}

/// A flat vector index: every chunk with its embedding, searched exhaustively
/// by cosine similarity. At the scale of one ingestion call (a handful of
/// articles) a linear scan beats any ANN structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorIndex {
    dimension: usize,
    entries: Vec<IndexEntry>,
}

impl VectorIndex {
    /// Pairs chunks with their embeddings. All embeddings must share one
    /// dimension and line up one-to-one with the chunks.
    pub fn build(
        chunks: Vec<DocumentChunk>,
        embeddings: Vec<Vec<f32>>,
    ) -> Result<Self, AppError> {
        if chunks.len() != embeddings.len() {
            return Err(AppError::Processing(format!(
                "chunk/embedding count mismatch: {} chunks, {} embeddings",
                chunks.len(),
                embeddings.len()
            )));
        }

        let dimension = embeddings.first().map_or(0, Vec::len);
        if dimension == 0 {
            return Err(AppError::Processing(
                "cannot build an index from zero chunks".into(),
            ));
        }

        let mut entries = Vec::with_capacity(chunks.len());
        for (chunk, embedding) in chunks.into_iter().zip(embeddings) {
            if embedding.len() != dimension {
                return Err(AppError::Processing(format!(
                    "embedding for chunk {} has dimension {}, expected {}",
                    chunk.id,
                    embedding.len(),
                    dimension
                )));
            }
            entries.push(IndexEntry { chunk, embedding });
        }

        Ok(Self { dimension, entries })
    }

    /// Top-k entries by cosine similarity against the query embedding.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>, AppError> {
        if query.len() != self.dimension {
            return Err(AppError::Validation(format!(
                "query embedding has dimension {}, index has {}",
                query.len(),
                self.dimension
            )));
        }

        let mut hits: Vec<SearchHit> = self
            .entries
            .iter()
            .map(|entry| SearchHit {
                chunk: entry.chunk.clone(),
                score: cosine_similarity(query, &entry.embedding),
            })
            .collect();

        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(k);
        Ok(hits)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
