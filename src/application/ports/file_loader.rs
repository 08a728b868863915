use async_trait::async_trait;

use crate::domain::{Page, SourceFile};

#[async_trait]
pub trait FileLoader: Send + Sync {
    /// Extracts the text of `data` page by page. Pages without text are left out.
    async fn extract_pages(
        &self,
        data: &[u8],
        source: &SourceFile,
    ) -> Result<Vec<Page>, FileLoaderError>;
}

#[derive(Debug, thiserror::Error)]
pub enum FileLoaderError {
    #[error("unreadable source {path}: {reason}")]
    Unreadable { path: String, reason: String },
    #[error("unsupported content type: {0}")]
    UnsupportedContentType(String),
    #[error("extraction failed: {0}")]
    ExtractionFailed(String),
    #[error("no text found in {0}")]
    NoTextFound(String),
}
