use async_trait::async_trait;

use crate::domain::{Chunk, Document};

#[async_trait]
pub trait TextSplitter: Send + Sync {
    async fn split(&self, document: &Document) -> Result<Vec<Chunk>, TextSplitterError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TextSplitterError {
    #[error("invalid parameters: chunk_size={chunk_size}, chunk_overlap={chunk_overlap}")]
    InvalidParameters {
        chunk_size: usize,
        chunk_overlap: usize,
    },
}
