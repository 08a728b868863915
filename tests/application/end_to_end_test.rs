use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use tower::ServiceExt;

use georag::application::ports::{CollectionConfig, Embedder, VectorStore};
use georag::application::services::{ContextStatus, IngestionService};
use georag::domain::ContentType;
use georag::infrastructure::llm::HashingEmbedder;
use georag::infrastructure::persistence::InMemoryVectorStore;
use georag::infrastructure::text_processing::{PlainTextAdapter, RecursiveCharacterSplitter};
use georag::presentation::{AppState, create_router};

use crate::helpers::{ScriptedLlmClient, retrieval_service, sse_payloads};

#[tokio::test]
async fn given_1200_char_document_when_ingested_and_queried_then_three_chunks_two_in_context_and_clean_sse()
 {
    let embedder: Arc<dyn Embedder> = Arc::new(HashingEmbedder::new(128));
    let store = Arc::new(InMemoryVectorStore::new());
    let text = "abcdefghij".repeat(120);
    assert_eq!(text.chars().count(), 1200);

    let ingestion = IngestionService::new(
        Arc::new(PlainTextAdapter::new()),
        Arc::clone(&embedder),
        Arc::clone(&store),
        Arc::new(RecursiveCharacterSplitter::new(500, 50).unwrap()),
        CollectionConfig::for_embedder("test_collection", embedder.as_ref()),
        10,
    );
    let report = ingestion
        .ingest(text.as_bytes(), "letters.txt".to_string(), ContentType::Text)
        .await
        .unwrap();
    assert_eq!(report.chunks, 3);

    let info = store.collection_info("test_collection").await.unwrap().unwrap();
    assert_eq!(info.record_count, 3);

    let llm = Arc::new(ScriptedLlmClient::new(&["The answer", " is here.", "\nSecond line"]));
    let service = Arc::new(retrieval_service(
        Arc::clone(&embedder),
        Arc::clone(&llm),
        Arc::clone(&store),
        2,
    ));

    let retrieved = service.build_context("test question").await;
    assert_eq!(retrieved.status, ContextStatus::Found);
    assert_eq!(retrieved.sources.len(), 2);
    assert_eq!(retrieved.text.split("\n\n").count(), 2);
    let mut offsets: Vec<usize> = retrieved.sources.iter().map(|r| r.chunk.offset).collect();
    offsets.sort_unstable();
    offsets.dedup();
    assert_eq!(offsets.len(), 2);
    assert!(offsets.iter().all(|o| [0, 450, 900].contains(o)));

    let app = create_router(AppState::new(service));
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/chat/stream")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"query":"test question"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/event-stream")
    );

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = String::from_utf8(body.to_vec()).unwrap();

    assert!(body.ends_with("\n\n"));
    for record in body.split("\n\n").filter(|r| !r.is_empty()) {
        for line in record.lines() {
            assert!(line.starts_with("data: ") || line == "data:", "bad line {line:?}");
        }
    }
    assert_eq!(
        sse_payloads(&body),
        vec!["The answer", " is here.", "\nSecond line"]
    );

    let prompt = llm.last_call();
    let final_turn = &prompt[prompt.len() - 1].content;
    assert!(final_turn.contains("test question"));
    assert!(final_turn.contains(&retrieved.text));
}

#[tokio::test]
async fn given_word_document_split_at_whitespace_when_building_context_then_text_is_exact_join_of_sources() {
    let embedder: Arc<dyn Embedder> = Arc::new(HashingEmbedder::new(128));
    let store = Arc::new(InMemoryVectorStore::new());
    let text = "word ".repeat(240);

    let ingestion = IngestionService::new(
        Arc::new(PlainTextAdapter::new()),
        Arc::clone(&embedder),
        Arc::clone(&store),
        Arc::new(RecursiveCharacterSplitter::new(500, 50).unwrap()),
        CollectionConfig::for_embedder("test_collection", embedder.as_ref()),
        10,
    );
    let report = ingestion
        .ingest(text.as_bytes(), "words.txt".to_string(), ContentType::Text)
        .await
        .unwrap();
    assert_eq!(report.chunks, 3);

    let service = retrieval_service(
        Arc::clone(&embedder),
        Arc::new(ScriptedLlmClient::new(&["ok"])),
        Arc::clone(&store),
        2,
    );

    let retrieved = service.build_context("test question").await;

    assert_eq!(retrieved.sources.len(), 2);
    let expected = retrieved
        .sources
        .iter()
        .map(|r| r.chunk.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");
    assert_eq!(retrieved.text, expected);
}
