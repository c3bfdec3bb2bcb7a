use std::future::IntoFuture;

use axum::http::StatusCode;
use common::index::store::IndexStore;
use futures::future::join_all;
use httpmock::{Method::GET, Method::POST, MockServer};
use serde_json::{json, Value};

mod test_utils;
use test_utils::*;

/// End-to-end tests for the research flow: URL ingestion, index persistence
/// and retrieval-augmented question answering. Article pages and the OpenAI
/// API are both served by local HTTP mocks; embeddings use the hashed
/// backend so no network credentials are needed.

#[tokio::test]
async fn full_research_flow_answers_with_sources() {
    let articles = MockServer::start_async().await;
    let openai = MockServer::start_async().await;
    let tmp = tempfile::tempdir().expect("tempdir");

    articles
        .mock_async(|when, then| {
            when.method(GET).path("/markets");
            then.status(200)
                .header("content-type", "text/html; charset=utf-8")
                .body(article_html(
                    "Quarterly results",
                    "Example Corp reported quarterly revenue growth of twelve percent, \
                     beating analyst expectations across every region it operates in.",
                ));
        })
        .await;

    let article_url = articles.url("/markets");
    let chat_mock = openai
        .mock_async(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(chat_completion_body(
                    "Example Corp's quarterly revenue grew twelve percent.",
                    &articles.url("/markets"),
                ));
        })
        .await;

    let config = test_config(&tmp.path().join("idx"), &openai.base_url());
    let server = test_server(&config);

    let ingest = server
        .post("/process-urls")
        .json(&json!({"urls": [article_url]}))
        .await;
    assert_eq!(ingest.status_code(), StatusCode::OK);
    let ingest_body: Value = ingest.json();
    assert_eq!(ingest_body["message"], "Vector index built successfully.");
    let documents_count = ingest_body["documents_count"]
        .as_u64()
        .expect("documents_count");
    assert!(documents_count >= 1);

    let ask = server
        .post("/ask-question")
        .json(&json!({"question": "How did Example Corp's revenue develop?"}))
        .await;
    assert_eq!(ask.status_code(), StatusCode::OK);
    let ask_body: Value = ask.json();
    assert!(!ask_body["answer"].as_str().expect("answer").is_empty());
    assert!(ask_body["sources"]
        .as_str()
        .expect("sources")
        .contains(&articles.url("/markets")));

    chat_mock.assert_async().await;
}

#[tokio::test]
async fn reported_count_matches_persisted_chunks() {
    let articles = MockServer::start_async().await;
    let tmp = tempfile::tempdir().expect("tempdir");

    articles
        .mock_async(|when, then| {
            when.method(GET).path("/long-read");
            then.status(200)
                .header("content-type", "text/html; charset=utf-8")
                .body(article_html(
                    "Long read",
                    &"A fairly long sentence about commodity markets and freight rates. "
                        .repeat(30),
                ));
        })
        .await;

    let config = test_config(&tmp.path().join("idx"), "http://127.0.0.1:1");
    let server = test_server(&config);

    let ingest = server
        .post("/process-urls")
        .json(&json!({"urls": [articles.url("/long-read")]}))
        .await;
    assert_eq!(ingest.status_code(), StatusCode::OK);
    let reported = ingest.json::<Value>()["documents_count"]
        .as_u64()
        .expect("documents_count") as usize;

    let store = IndexStore::new(config.index_dir.clone());
    let (manifest, index) = store.load().await.expect("persisted index loads");
    assert_eq!(reported, index.len());
    assert_eq!(manifest.chunk_count, index.len());
    assert!(index
        .entries()
        .iter()
        .all(|entry| entry.chunk.text.chars().count() <= config.max_chunk_chars));
}

#[tokio::test]
async fn second_ingestion_fully_replaces_the_first() {
    let articles = MockServer::start_async().await;
    let tmp = tempfile::tempdir().expect("tempdir");

    for (path, topic) in [
        ("/first", "A story about central bank policy and interest rates."),
        ("/second", "A story about semiconductor supply chains."),
    ] {
        articles
            .mock_async(move |when, then| {
                when.method(GET).path(path);
                then.status(200)
                    .header("content-type", "text/html; charset=utf-8")
                    .body(article_html("Story", topic));
            })
            .await;
    }

    let config = test_config(&tmp.path().join("idx"), "http://127.0.0.1:1");
    let server = test_server(&config);

    for path in ["/first", "/second"] {
        let response = server
            .post("/process-urls")
            .json(&json!({"urls": [articles.url(path)]}))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
    }

    let store = IndexStore::new(config.index_dir.clone());
    let (_, index) = store.load().await.expect("persisted index loads");
    let second_url = articles.url("/second");
    assert!(index
        .entries()
        .iter()
        .all(|entry| entry.chunk.source_url == second_url));
}

#[tokio::test]
async fn one_bad_url_fails_the_whole_ingestion() {
    let articles = MockServer::start_async().await;
    let tmp = tempfile::tempdir().expect("tempdir");

    articles
        .mock_async(|when, then| {
            when.method(GET).path("/good");
            then.status(200)
                .header("content-type", "text/html; charset=utf-8")
                .body(article_html(
                    "Good article",
                    "Plenty of readable text about shipping lanes and tariffs.",
                ));
        })
        .await;
    articles
        .mock_async(|when, then| {
            when.method(GET).path("/broken");
            then.status(500);
        })
        .await;

    let config = test_config(&tmp.path().join("idx"), "http://127.0.0.1:1");
    let server = test_server(&config);

    let response = server
        .post("/process-urls")
        .json(&json!({"urls": [articles.url("/good"), articles.url("/broken")]}))
        .await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert!(!body["detail"].as_str().expect("detail").is_empty());

    let store = IndexStore::new(config.index_dir.clone());
    assert!(!store.exists().await, "failed ingestion must not persist");
}

#[tokio::test]
async fn question_before_ingestion_is_a_400_not_a_500() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let config = test_config(&tmp.path().join("idx"), "http://127.0.0.1:1");
    let server = test_server(&config);

    let response = server
        .post("/ask-question")
        .json(&json!({"question": "Anything indexed yet?"}))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["detail"].as_str().expect("detail").contains("index"));
}

#[tokio::test]
async fn concurrent_ingestion_and_queries_do_not_crash() {
    let articles = MockServer::start_async().await;
    let openai = MockServer::start_async().await;
    let tmp = tempfile::tempdir().expect("tempdir");

    articles
        .mock_async(|when, then| {
            when.method(GET).path("/feed");
            then.status(200)
                .header("content-type", "text/html; charset=utf-8")
                .body(article_html(
                    "Feed",
                    "Rolling coverage of energy markets and grid investments.",
                ));
        })
        .await;
    openai
        .mock_async(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(chat_completion_body("An answer.", "a source"));
        })
        .await;

    let config = test_config(&tmp.path().join("idx"), &openai.base_url());
    let server = test_server(&config);

    // Seed an index so queries have something to race against.
    let seed = server
        .post("/process-urls")
        .json(&json!({"urls": [articles.url("/feed")]}))
        .await;
    assert_eq!(seed.status_code(), StatusCode::OK);

    let ingest_body = json!({"urls": [articles.url("/feed")]});
    let question_body = json!({"question": "What is covered?"});
    let mut requests = Vec::new();
    for i in 0..6 {
        if i % 2 == 0 {
            requests.push(server.post("/process-urls").json(&ingest_body).into_future());
        } else {
            requests.push(server.post("/ask-question").json(&question_body).into_future());
        }
    }

    // The interleaving is undefined; the invariant is that every request
    // completes with one of the documented statuses.
    for response in join_all(requests).await {
        let status = response.status_code();
        assert!(
            status == StatusCode::OK
                || status == StatusCode::BAD_REQUEST
                || status == StatusCode::INTERNAL_SERVER_ERROR,
            "unexpected status {status}"
        );
    }
}
