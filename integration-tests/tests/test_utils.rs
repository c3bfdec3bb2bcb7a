use std::path::Path;

use api_router::{api_router, api_state::ApiState};
use axum_test::TestServer;
use common::utils::config::{AppConfig, EmbeddingBackend};
use serde_json::{json, Value};

/// Config wired for tests: hashed embeddings (no network), private hosts
/// allowed so articles can be served from a local mock.
pub fn test_config(index_dir: &Path, openai_base_url: &str) -> AppConfig {
    AppConfig {
        openai_api_key: "sk-test".to_string(),
        openai_base_url: openai_base_url.to_string(),
        http_port: 0,
        frontend_origin: "http://localhost:3000".to_string(),
        index_dir: index_dir.to_string_lossy().into_owned(),
        embedding_backend: EmbeddingBackend::Hashed,
        embedding_model: "text-embedding-3-small".to_string(),
        embedding_dimensions: 64,
        query_model: "gpt-4o-mini".to_string(),
        retrieval_top_k: 4,
        max_chunk_chars: 1000,
        allow_private_urls: true,
    }
}

pub fn test_server(config: &AppConfig) -> TestServer {
    let state = ApiState::new(config);
    let router = api_router(state).expect("router should build");
    TestServer::new(router).expect("test server should start")
}

/// A minimal but readability-parseable article page. The body is padded well
/// past the extractor's content threshold.
pub fn article_html(title: &str, body_sentences: &str) -> String {
    let paragraph = format!("{body_sentences} ").repeat(4);
    format!(
        "<html><head><title>{title}</title></head><body><article>\
         <h1>{title}</h1>\
         <p>{paragraph}</p><p>{paragraph}</p><p>{paragraph}</p><p>{paragraph}</p>\
         </article></body></html>"
    )
}

/// A chat-completions response whose content is the JSON the answer schema
/// demands.
pub fn chat_completion_body(answer: &str, sources: &str) -> Value {
    let content =
        serde_json::to_string(&json!({"answer": answer, "sources": sources}))
            .expect("content encodes");
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "created": 1,
        "model": "gpt-4o-mini",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
}
