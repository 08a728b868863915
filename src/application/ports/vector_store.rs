use async_trait::async_trait;

use super::{CollectionConfig, CollectionInfo, SearchResult, VectorStoreError};
use crate::domain::{Chunk, Embedding};

#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Writes one batch atomically. The collection is created on first write
    /// with the dimensionality of that batch.
    async fn write(
        &self,
        collection: &CollectionConfig,
        chunks: &[Chunk],
        embeddings: &[Embedding],
    ) -> Result<(), VectorStoreError>;

    /// Returns at most `top_k` records ordered by descending score, ties
    /// resolved by insertion order.
    async fn query(
        &self,
        collection: &CollectionConfig,
        embedding: &Embedding,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, VectorStoreError>;

    async fn collection_info(&self, name: &str) -> Result<Option<CollectionInfo>, VectorStoreError>;

    async fn delete_collection(&self, name: &str) -> Result<(), VectorStoreError>;
}
