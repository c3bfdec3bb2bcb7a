use std::sync::Arc;

use async_openai::config::OpenAIConfig;

use common::{
    index::store::IndexStore,
    utils::{config::AppConfig, embedding::EmbeddingProvider},
};
use ingestion_pipeline::{DefaultIngestionServices, IngestionServices};

#[derive(Clone)]
pub struct ApiState {
    pub config: AppConfig,
    pub openai_client: Arc<async_openai::Client<OpenAIConfig>>,
    pub embedding_provider: Arc<EmbeddingProvider>,
    pub index_store: IndexStore,
    pub ingestion: Arc<dyn IngestionServices>,
}

impl ApiState {
    pub fn new(config: &AppConfig) -> Self {
        let openai_client = Arc::new(async_openai::Client::with_config(
            OpenAIConfig::new()
                .with_api_key(&config.openai_api_key)
                .with_api_base(&config.openai_base_url),
        ));

        let embedding_provider = Arc::new(EmbeddingProvider::from_config(
            config,
            Arc::clone(&openai_client),
        ));
        let index_store = IndexStore::new(config.index_dir.clone());
        let ingestion = Arc::new(DefaultIngestionServices::new(
            config,
            Arc::clone(&embedding_provider),
        ));

        Self {
            config: config.clone(),
            openai_client,
            embedding_provider,
            index_store,
            ingestion,
        }
    }
}
