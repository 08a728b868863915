use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::application::ports::{
    CollectionConfig, CollectionInfo, DistanceMetric, SearchResult, VectorStore, VectorStoreError,
};
use crate::domain::{Chunk, Embedding};

struct StoredCollection {
    embedding_model: String,
    dimensions: usize,
    distance_metric: DistanceMetric,
    records: Vec<(Chunk, Embedding)>,
}

impl StoredCollection {
    fn check_identity(&self, collection: &CollectionConfig) -> Result<(), VectorStoreError> {
        if self.embedding_model != collection.embedding_model {
            return Err(VectorStoreError::EmbeddingModelMismatch {
                collection: collection.name.clone(),
                expected: self.embedding_model.clone(),
                actual: collection.embedding_model.clone(),
            });
        }
        if self.distance_metric != collection.distance_metric {
            return Err(VectorStoreError::DistanceMetricMismatch {
                collection: collection.name.clone(),
                expected: self.distance_metric,
                actual: collection.distance_metric,
            });
        }
        Ok(())
    }

    fn check_dimensions(&self, actual: usize) -> Result<(), VectorStoreError> {
        if self.dimensions != actual {
            return Err(VectorStoreError::DimensionMismatch {
                expected: self.dimensions,
                actual,
            });
        }
        Ok(())
    }
}

/// Process-local store with brute-force scoring. Records keep insertion order,
/// which is what breaks ties between equal scores.
#[derive(Default)]
pub struct InMemoryVectorStore {
    collections: RwLock<HashMap<String, StoredCollection>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn batch_dimensions(
    chunks: &[Chunk],
    embeddings: &[Embedding],
) -> Result<Option<usize>, VectorStoreError> {
    if chunks.len() != embeddings.len() {
        return Err(VectorStoreError::WriteFailed(format!(
            "{} chunks but {} embeddings",
            chunks.len(),
            embeddings.len()
        )));
    }

    let Some(first) = embeddings.first() else {
        return Ok(None);
    };
    let dimensions = first.dimensions();
    if dimensions == 0 {
        return Err(VectorStoreError::WriteFailed("empty embedding vector".to_string()));
    }
    if let Some(odd) = embeddings.iter().find(|e| e.dimensions() != dimensions) {
        return Err(VectorStoreError::DimensionMismatch {
            expected: dimensions,
            actual: odd.dimensions(),
        });
    }
    Ok(Some(dimensions))
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn write(
        &self,
        collection: &CollectionConfig,
        chunks: &[Chunk],
        embeddings: &[Embedding],
    ) -> Result<(), VectorStoreError> {
        let Some(dimensions) = batch_dimensions(chunks, embeddings)? else {
            return Ok(());
        };

        let mut collections = self.collections.write().await;
        let stored = collections
            .entry(collection.name.clone())
            .or_insert_with(|| {
                tracing::info!(
                    collection = %collection.name,
                    model = %collection.embedding_model,
                    dimensions,
                    metric = %collection.distance_metric,
                    "Creating collection"
                );
                StoredCollection {
                    embedding_model: collection.embedding_model.clone(),
                    dimensions,
                    distance_metric: collection.distance_metric,
                    records: Vec::new(),
                }
            });

        stored.check_identity(collection)?;
        stored.check_dimensions(dimensions)?;

        stored.records.extend(
            chunks
                .iter()
                .cloned()
                .zip(embeddings.iter().cloned()),
        );

        tracing::debug!(collection = %collection.name, written = chunks.len(), "Batch written");
        Ok(())
    }

    async fn query(
        &self,
        collection: &CollectionConfig,
        embedding: &Embedding,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, VectorStoreError> {
        if top_k == 0 {
            return Err(VectorStoreError::InvalidTopK);
        }

        let collections = self.collections.read().await;
        let Some(stored) = collections.get(&collection.name) else {
            return Ok(Vec::new());
        };

        stored.check_identity(collection)?;
        stored.check_dimensions(embedding.dimensions())?;

        let mut results: Vec<SearchResult> = stored
            .records
            .iter()
            .map(|(chunk, vector)| SearchResult {
                chunk: chunk.clone(),
                score: stored.distance_metric.score(embedding, vector),
            })
            .collect();

        // Stable sort: equal scores stay in insertion order.
        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results.truncate(top_k);

        Ok(results)
    }

    async fn collection_info(&self, name: &str) -> Result<Option<CollectionInfo>, VectorStoreError> {
        let collections = self.collections.read().await;
        Ok(collections.get(name).map(|stored| CollectionInfo {
            name: name.to_string(),
            embedding_model: stored.embedding_model.clone(),
            dimensions: stored.dimensions,
            distance_metric: stored.distance_metric,
            record_count: stored.records.len(),
        }))
    }

    async fn delete_collection(&self, name: &str) -> Result<(), VectorStoreError> {
        if self.collections.write().await.remove(name).is_some() {
            tracing::info!(collection = name, "Collection deleted");
        }
        Ok(())
    }
}
