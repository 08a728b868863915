use super::DistanceMetric;

#[derive(Debug, thiserror::Error)]
pub enum VectorStoreError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),
    #[error("write failed: {0}")]
    WriteFailed(String),
    #[error("dimension mismatch: collection holds {expected}-dimensional vectors, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error(
        "embedding model mismatch for collection {collection}: stored {expected}, requested {actual}"
    )]
    EmbeddingModelMismatch {
        collection: String,
        expected: String,
        actual: String,
    },
    #[error(
        "distance metric mismatch for collection {collection}: stored {expected}, requested {actual}"
    )]
    DistanceMetricMismatch {
        collection: String,
        expected: DistanceMetric,
        actual: DistanceMetric,
    },
    #[error("top_k must be at least 1")]
    InvalidTopK,
    #[error("query failed: {0}")]
    QueryFailed(String),
    #[error("collection deletion failed: {0}")]
    CollectionDeletionFailed(String),
}
