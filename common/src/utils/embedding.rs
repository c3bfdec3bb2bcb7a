use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    sync::Arc,
};

use anyhow::anyhow;
use async_openai::{config::OpenAIConfig, types::CreateEmbeddingRequestArgs, Client};

use crate::{
    error::AppError,
    utils::config::{AppConfig, EmbeddingBackend},
};

/// Produces embedding vectors for chunk and query text.
///
/// Two backends: the OpenAI embeddings API, and a deterministic hashed
/// bag-of-words embedding that needs no network access. The hashed backend
/// exists for offline deployments and for tests.
#[derive(Clone)]
pub struct EmbeddingProvider {
    inner: EmbeddingInner,
}

#[derive(Clone)]
enum EmbeddingInner {
    OpenAI {
        client: Arc<Client<OpenAIConfig>>,
        model: String,
        dimensions: u32,
    },
    Hashed {
        dimension: usize,
    },
}

impl EmbeddingProvider {
    pub fn from_config(config: &AppConfig, client: Arc<Client<OpenAIConfig>>) -> Self {
        match config.embedding_backend {
            EmbeddingBackend::OpenAI => Self::new_openai(
                client,
                config.embedding_model.clone(),
                config.embedding_dimensions,
            ),
            EmbeddingBackend::Hashed => Self::new_hashed(config.embedding_dimensions as usize),
        }
    }

    pub fn new_openai(client: Arc<Client<OpenAIConfig>>, model: String, dimensions: u32) -> Self {
        EmbeddingProvider {
            inner: EmbeddingInner::OpenAI {
                client,
                model,
                dimensions,
            },
        }
    }

    pub fn new_hashed(dimension: usize) -> Self {
        EmbeddingProvider {
            inner: EmbeddingInner::Hashed {
                dimension: dimension.max(1),
            },
        }
    }

    pub fn backend_label(&self) -> &'static str {
        match self.inner {
            EmbeddingInner::OpenAI { .. } => "openai",
            EmbeddingInner::Hashed { .. } => "hashed",
        }
    }

    pub fn model_code(&self) -> Option<String> {
        match &self.inner {
            EmbeddingInner::OpenAI { model, .. } => Some(model.clone()),
            EmbeddingInner::Hashed { .. } => None,
        }
    }

    pub fn dimension(&self) -> usize {
        match &self.inner {
            EmbeddingInner::OpenAI { dimensions, .. } => *dimensions as usize,
            EmbeddingInner::Hashed { dimension } => *dimension,
        }
    }

    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, AppError> {
        match &self.inner {
            EmbeddingInner::Hashed { dimension } => Ok(hashed_embedding(text, *dimension)),
            EmbeddingInner::OpenAI {
                client,
                model,
                dimensions,
            } => {
                let request = CreateEmbeddingRequestArgs::default()
                    .model(model.clone())
                    .input([text])
                    .dimensions(*dimensions)
                    .build()?;

                let response = client.embeddings().create(request).await?;

                let embedding = response
                    .data
                    .first()
                    .ok_or_else(|| {
                        AppError::LLMParsing("No embedding data received from API".into())
                    })?
                    .embedding
                    .clone();

                Ok(embedding)
            }
        }
    }

    pub async fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, AppError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        match &self.inner {
            EmbeddingInner::Hashed { dimension } => Ok(texts
                .into_iter()
                .map(|text| hashed_embedding(&text, *dimension))
                .collect()),
            EmbeddingInner::OpenAI {
                client,
                model,
                dimensions,
            } => {
                let expected = texts.len();
                let request = CreateEmbeddingRequestArgs::default()
                    .model(model.clone())
                    .input(texts)
                    .dimensions(*dimensions)
                    .build()?;

                let response = client.embeddings().create(request).await?;

                let embeddings: Vec<Vec<f32>> = response
                    .data
                    .into_iter()
                    .map(|item| item.embedding)
                    .collect();

                if embeddings.len() != expected {
                    return Err(AppError::Anyhow(anyhow!(
                        "embedding API returned {} vectors for {} inputs",
                        embeddings.len(),
                        expected
                    )));
                }

                Ok(embeddings)
            }
        }
    }
}

// L2-normalized token-count vector; tokens are bucketed by hash.
fn hashed_embedding(text: &str, dimension: usize) -> Vec<f32> {
    let dim = dimension.max(1);
    let mut vector = vec![0.0f32; dim];

    for token in tokens(text) {
        let idx = bucket(&token, dim);
        vector[idx] += 1.0;
    }

    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        for value in &mut vector {
            *value /= norm;
        }
    }

    vector
}

fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(|token| token.to_ascii_lowercase())
}

fn bucket(token: &str, dimension: usize) -> usize {
    let mut hasher = DefaultHasher::new();
    token.hash(&mut hasher);
    (hasher.finish() as usize) % dimension
}
