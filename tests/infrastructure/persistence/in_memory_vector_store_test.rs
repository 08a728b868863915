use georag::application::ports::{
    CollectionConfig, DistanceMetric, VectorStore, VectorStoreError,
};
use georag::domain::{Chunk, DocumentId, Embedding};
use georag::infrastructure::persistence::InMemoryVectorStore;

const MODEL: &str = "test-embedder";

fn collection() -> CollectionConfig {
    CollectionConfig::new("atlas", MODEL)
}

fn chunk(text: &str) -> Chunk {
    Chunk::new(text.to_string(), DocumentId::new(), "atlas.pdf", Some(1), 0)
}

fn vector(values: &[f32]) -> Embedding {
    Embedding::new(values.to_vec())
}

async fn store_with(records: &[(&str, &[f32])]) -> InMemoryVectorStore {
    let store = InMemoryVectorStore::new();
    let chunks: Vec<Chunk> = records.iter().map(|(text, _)| chunk(text)).collect();
    let embeddings: Vec<Embedding> = records.iter().map(|(_, v)| vector(v)).collect();
    store.write(&collection(), &chunks, &embeddings).await.unwrap();
    store
}

fn texts(results: &[georag::application::ports::SearchResult]) -> Vec<&str> {
    results.iter().map(|r| r.chunk.text.as_str()).collect()
}

#[tokio::test]
async fn given_first_write_when_writing_then_collection_created_with_dimensions() {
    let store = store_with(&[("a", &[1.0, 0.0, 0.0]), ("b", &[0.0, 1.0, 0.0])]).await;

    let info = store.collection_info("atlas").await.unwrap().unwrap();

    assert_eq!(info.dimensions, 3);
    assert_eq!(info.record_count, 2);
    assert_eq!(info.embedding_model, MODEL);
}

#[tokio::test]
async fn given_existing_collection_when_writing_other_dimension_then_dimension_mismatch() {
    let store = store_with(&[("a", &[1.0, 0.0, 0.0])]).await;

    let result = store
        .write(&collection(), &[chunk("b")], &[vector(&[1.0, 0.0])])
        .await;

    assert!(matches!(
        result,
        Err(VectorStoreError::DimensionMismatch {
            expected: 3,
            actual: 2
        })
    ));
    assert_eq!(store.collection_info("atlas").await.unwrap().unwrap().record_count, 1);
}

#[tokio::test]
async fn given_existing_collection_when_writing_with_other_model_then_model_mismatch() {
    let store = store_with(&[("a", &[1.0, 0.0])]).await;

    let result = store
        .write(
            &CollectionConfig::new("atlas", "other-model"),
            &[chunk("b")],
            &[vector(&[0.0, 1.0])],
        )
        .await;

    assert!(matches!(
        result,
        Err(VectorStoreError::EmbeddingModelMismatch { .. })
    ));
}

#[tokio::test]
async fn given_batch_with_mixed_dimensions_when_writing_then_nothing_is_visible() {
    let store = InMemoryVectorStore::new();

    let result = store
        .write(
            &collection(),
            &[chunk("a"), chunk("b")],
            &[vector(&[1.0, 0.0]), vector(&[1.0, 0.0, 0.0])],
        )
        .await;

    assert!(result.is_err());
    assert!(store.collection_info("atlas").await.unwrap().is_none());
}

#[tokio::test]
async fn given_mismatched_lengths_when_writing_then_write_failed() {
    let store = InMemoryVectorStore::new();

    let result = store
        .write(&collection(), &[chunk("a"), chunk("b")], &[vector(&[1.0])])
        .await;

    assert!(matches!(result, Err(VectorStoreError::WriteFailed(_))));
}

#[tokio::test]
async fn given_empty_batch_when_writing_then_no_op() {
    let store = InMemoryVectorStore::new();

    store.write(&collection(), &[], &[]).await.unwrap();

    assert!(store.collection_info("atlas").await.unwrap().is_none());
}

#[tokio::test]
async fn given_k_larger_than_collection_when_querying_then_returns_all_sorted() {
    let store = store_with(&[
        ("far", &[0.0, 1.0]),
        ("near", &[1.0, 0.0]),
        ("middle", &[1.0, 1.0]),
    ])
    .await;

    let results = store.query(&collection(), &vector(&[1.0, 0.0]), 10).await.unwrap();

    assert_eq!(texts(&results), vec!["near", "middle", "far"]);
    assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
}

#[tokio::test]
async fn given_equal_scores_when_querying_then_earlier_insertion_wins() {
    let store = store_with(&[
        ("first", &[1.0, 0.0]),
        ("second", &[2.0, 0.0]),
        ("third", &[3.0, 0.0]),
    ])
    .await;

    for _ in 0..5 {
        let results = store.query(&collection(), &vector(&[1.0, 0.0]), 2).await.unwrap();
        assert_eq!(texts(&results), vec!["first", "second"]);
    }
}

#[tokio::test]
async fn given_zero_k_when_querying_then_invalid_top_k() {
    let store = store_with(&[("a", &[1.0])]).await;

    let result = store.query(&collection(), &vector(&[1.0]), 0).await;

    assert!(matches!(result, Err(VectorStoreError::InvalidTopK)));
}

#[tokio::test]
async fn given_query_of_other_dimension_when_querying_then_dimension_mismatch() {
    let store = store_with(&[("a", &[1.0, 0.0])]).await;

    let result = store.query(&collection(), &vector(&[1.0, 0.0, 0.0]), 1).await;

    assert!(matches!(
        result,
        Err(VectorStoreError::DimensionMismatch { .. })
    ));
}

#[tokio::test]
async fn given_missing_collection_when_querying_then_empty() {
    let store = InMemoryVectorStore::new();

    let results = store.query(&collection(), &vector(&[1.0]), 3).await.unwrap();

    assert!(results.is_empty());
}

#[tokio::test]
async fn given_euclidean_metric_when_querying_then_closest_point_first() {
    let store = InMemoryVectorStore::new();
    let euclidean = collection().with_distance_metric(DistanceMetric::Euclidean);
    store
        .write(
            &euclidean,
            &[chunk("long"), chunk("short")],
            &[vector(&[10.0, 0.0]), vector(&[1.0, 0.0])],
        )
        .await
        .unwrap();

    let results = store.query(&euclidean, &vector(&[1.5, 0.0]), 1).await.unwrap();

    assert_eq!(texts(&results), vec!["short"]);
}

#[tokio::test]
async fn given_cosine_collection_when_using_other_metric_then_metric_mismatch() {
    let store = store_with(&[("a", &[1.0, 0.0])]).await;
    let dot = collection().with_distance_metric(DistanceMetric::DotProduct);

    let queried = store.query(&dot, &vector(&[1.0, 0.0]), 1).await;
    let written = store.write(&dot, &[chunk("b")], &[vector(&[0.0, 1.0])]).await;

    assert!(matches!(
        queried,
        Err(VectorStoreError::DistanceMetricMismatch {
            expected: DistanceMetric::Cosine,
            actual: DistanceMetric::DotProduct,
            ..
        })
    ));
    assert!(matches!(written, Err(VectorStoreError::DistanceMetricMismatch { .. })));
    let info = store.collection_info("atlas").await.unwrap().unwrap();
    assert_eq!(info.record_count, 1);
    assert_eq!(info.distance_metric, DistanceMetric::Cosine);
}

#[tokio::test]
async fn given_collection_when_deleting_then_gone_and_recreatable() {
    let store = store_with(&[("a", &[1.0, 0.0])]).await;

    store.delete_collection("atlas").await.unwrap();
    assert!(store.collection_info("atlas").await.unwrap().is_none());

    store
        .write(&collection(), &[chunk("b")], &[vector(&[1.0, 0.0, 0.0])])
        .await
        .unwrap();
    assert_eq!(store.collection_info("atlas").await.unwrap().unwrap().dimensions, 3);
}
