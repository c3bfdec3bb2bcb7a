use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Clone, Copy, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    OpenAI,
    Hashed,
}

fn default_embedding_backend() -> EmbeddingBackend {
    EmbeddingBackend::OpenAI
}

#[derive(Clone, Deserialize, Debug)]
pub struct AppConfig {
    pub openai_api_key: String,
    #[serde(default = "default_base_url")]
    pub openai_base_url: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    #[serde(default = "default_frontend_origin")]
    pub frontend_origin: String,
    #[serde(default = "default_index_dir")]
    pub index_dir: String,
    #[serde(default = "default_embedding_backend")]
    pub embedding_backend: EmbeddingBackend,
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
    #[serde(default = "default_embedding_dimensions")]
    pub embedding_dimensions: u32,
    #[serde(default = "default_query_model")]
    pub query_model: String,
    #[serde(default = "default_retrieval_top_k")]
    pub retrieval_top_k: usize,
    #[serde(default = "default_max_chunk_chars")]
    pub max_chunk_chars: usize,
    #[serde(default)]
    pub allow_private_urls: bool,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_http_port() -> u16 {
    8000
}

fn default_frontend_origin() -> String {
    "http://localhost:3000".to_string()
}

fn default_index_dir() -> String {
    "./article_index".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_embedding_dimensions() -> u32 {
    1536
}

fn default_query_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_retrieval_top_k() -> usize {
    4
}

fn default_max_chunk_chars() -> usize {
    1000
}

pub fn get_config() -> Result<AppConfig, ConfigError> {
    // Credentials may live in a local .env next to the binary.
    dotenvy::dotenv().ok();

    let config = Config::builder()
        .add_source(File::with_name("config").required(false))
        .add_source(Environment::default())
        .build()?;

    config.try_deserialize()
}
