use std::sync::Arc;

use georag::application::ports::{CollectionConfig, Embedder, SearchResult, VectorStore};
use georag::application::services::{
    ContextStatus, NO_REFERENCE_NOTICE, RetrievalError, RetrievedContext, StreamEvent, format_context,
};
use georag::domain::{ChatTurn, Chunk, DocumentId, Embedding, MessageRole};
use georag::infrastructure::persistence::InMemoryVectorStore;

use crate::helpers::{
    FailingEmbedder, FailingVectorStore, FixedEmbedder, ScriptedLlmClient, TEST_FAILURE_MESSAGE,
    TEST_PERSONA, retrieval_service,
};

fn chunk(text: &str) -> Chunk {
    Chunk::new(text.to_string(), DocumentId::new(), "atlas.pdf", Some(1), 0)
}

async fn seeded_store(embedder: &dyn Embedder) -> Arc<InMemoryVectorStore> {
    let store = Arc::new(InMemoryVectorStore::new());
    let collection = CollectionConfig::for_embedder("test_collection", embedder);
    store
        .write(
            &collection,
            &[
                chunk("Rivers flow downhill."),
                chunk("Deserts receive little rain."),
                chunk("Deltas form at river mouths."),
            ],
            &[
                Embedding::new(vec![1.0, 0.0]),
                Embedding::new(vec![0.0, 1.0]),
                Embedding::new(vec![0.8, 0.6]),
            ],
        )
        .await
        .unwrap();
    store
}

async fn drain(mut events: tokio::sync::mpsc::Receiver<StreamEvent>) -> Vec<StreamEvent> {
    let mut collected = Vec::new();
    while let Some(event) = events.recv().await {
        collected.push(event);
    }
    collected
}

#[tokio::test]
async fn given_seeded_collection_when_retrieving_then_returns_top_k_by_similarity() {
    let embedder: Arc<dyn Embedder> = Arc::new(FixedEmbedder::new(vec![1.0, 0.0]));
    let store = seeded_store(embedder.as_ref()).await;
    let service = retrieval_service(
        embedder,
        Arc::new(ScriptedLlmClient::new(&[])),
        store,
        2,
    );

    let results = service.retrieve("Where do rivers go?").await.unwrap();

    let texts: Vec<&str> = results.iter().map(|r| r.chunk.text.as_str()).collect();
    assert_eq!(texts, vec!["Rivers flow downhill.", "Deltas form at river mouths."]);
    assert!(results[0].score >= results[1].score);
}

#[tokio::test]
async fn given_results_when_formatting_context_then_joins_texts_unchanged_in_order() {
    let results = vec![
        SearchResult {
            chunk: chunk("  first  "),
            score: 0.9,
        },
        SearchResult {
            chunk: chunk("   "),
            score: 0.8,
        },
        SearchResult {
            chunk: chunk("second"),
            score: 0.7,
        },
    ];

    assert_eq!(format_context(&results), "  first  \n\n   \n\nsecond");
    assert_eq!(format_context(&[]), "");
}

#[tokio::test]
async fn given_only_empty_chunks_when_building_context_from_results_then_status_is_empty() {
    let empty = RetrievedContext::from_results(vec![SearchResult {
        chunk: chunk(""),
        score: 0.5,
    }]);
    let blank = RetrievedContext::from_results(vec![SearchResult {
        chunk: chunk("   "),
        score: 0.5,
    }]);

    assert_eq!(empty.status, ContextStatus::Empty);
    assert_eq!(blank.status, ContextStatus::Found);
    assert_eq!(blank.text, "   ");
}

#[tokio::test]
async fn given_failing_embedder_when_retrieving_then_returns_embedding_error() {
    let service = retrieval_service(
        Arc::new(FailingEmbedder),
        Arc::new(ScriptedLlmClient::new(&[])),
        Arc::new(InMemoryVectorStore::new()),
        3,
    );

    let result = service.retrieve("anything").await;

    assert!(matches!(result, Err(RetrievalError::Embedding(_))));
}

#[tokio::test]
async fn given_unreachable_store_when_querying_then_streams_answer_without_context() {
    let llm = Arc::new(ScriptedLlmClient::new(&["I have ", "no sources."]));
    let service = retrieval_service(
        Arc::new(FixedEmbedder::new(vec![1.0, 0.0])),
        Arc::clone(&llm),
        Arc::new(FailingVectorStore),
        3,
    );

    let stream = service.query_stream("How deep is Lake Baikal?", &[]).await;

    assert_eq!(stream.context.status, ContextStatus::Unavailable);
    assert!(stream.context.text.is_empty());
    assert_eq!(
        drain(stream.events).await,
        vec![
            StreamEvent::Fragment("I have ".to_string()),
            StreamEvent::Fragment("no sources.".to_string()),
        ]
    );

    let sent = llm.last_call();
    assert_eq!(sent[1], ChatTurn::system(NO_REFERENCE_NOTICE));
    assert_eq!(sent.last(), Some(&ChatTurn::user("How deep is Lake Baikal?")));
}

#[tokio::test]
async fn given_collection_of_other_model_when_querying_then_context_unavailable() {
    let store = Arc::new(InMemoryVectorStore::new());
    store
        .write(
            &CollectionConfig::new("test_collection", "another-model"),
            &[chunk("Mountains are tall.")],
            &[Embedding::new(vec![1.0, 0.0])],
        )
        .await
        .unwrap();
    let service = retrieval_service(
        Arc::new(FixedEmbedder::new(vec![1.0, 0.0])),
        Arc::new(ScriptedLlmClient::new(&["ok"])),
        store,
        3,
    );

    assert!(matches!(
        service.retrieve("q").await,
        Err(RetrievalError::Search(_))
    ));
    let context = service.build_context("q").await;
    assert_eq!(context.status, ContextStatus::Unavailable);
}

#[tokio::test]
async fn given_empty_collection_when_querying_then_context_empty() {
    let service = retrieval_service(
        Arc::new(FixedEmbedder::new(vec![1.0, 0.0])),
        Arc::new(ScriptedLlmClient::new(&["ok"])),
        Arc::new(InMemoryVectorStore::new()),
        3,
    );

    let context = service.build_context("q").await;

    assert_eq!(context.status, ContextStatus::Empty);
    assert!(context.sources.is_empty());
}

#[tokio::test]
async fn given_history_when_querying_then_llm_receives_persona_history_and_context() {
    let embedder: Arc<dyn Embedder> = Arc::new(FixedEmbedder::new(vec![1.0, 0.0]));
    let store = seeded_store(embedder.as_ref()).await;
    let llm = Arc::new(ScriptedLlmClient::new(&["Downhill."]));
    let service = retrieval_service(embedder, Arc::clone(&llm), store, 1);
    let history = vec![
        ChatTurn::user("Hi"),
        ChatTurn::assistant("Hello, ask me about geography."),
    ];

    let stream = service.query_stream("Where do rivers flow?", &history).await;
    let events = drain(stream.events).await;

    assert_eq!(stream.context.status, ContextStatus::Found);
    assert_eq!(stream.context.text, "Rivers flow downhill.");
    assert_eq!(events, vec![StreamEvent::Fragment("Downhill.".to_string())]);

    let sent = llm.last_call();
    assert_eq!(sent.len(), 4);
    assert_eq!(sent[0], ChatTurn::system(TEST_PERSONA));
    assert_eq!(&sent[1..3], history.as_slice());
    assert_eq!(sent[3].role, MessageRole::User);
    assert!(sent[3].content.contains("Rivers flow downhill."));
    assert!(sent[3].content.contains("Where do rivers flow?"));
}

#[tokio::test]
async fn given_llm_fails_mid_stream_when_querying_then_last_event_is_apology() {
    let service = retrieval_service(
        Arc::new(FixedEmbedder::new(vec![1.0, 0.0])),
        Arc::new(ScriptedLlmClient::failing_after(&["Partial", "never"], 1)),
        Arc::new(InMemoryVectorStore::new()),
        3,
    );

    let events = drain(service.query_stream("q", &[]).await.events).await;

    assert_eq!(
        events,
        vec![
            StreamEvent::Fragment("Partial".to_string()),
            StreamEvent::Failed(TEST_FAILURE_MESSAGE.to_string()),
        ]
    );
}
