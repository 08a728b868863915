use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::application::ports::{FileLoader, FileLoaderError};
use crate::domain::{ContentType, Page, SourceFile};

use super::{PdfAdapter, PlainTextAdapter};

/// Routes each source to the loader registered for its content type.
pub struct CompositeFileLoader {
    adapters: HashMap<ContentType, Arc<dyn FileLoader>>,
}

impl CompositeFileLoader {
    pub fn new(adapters: Vec<(ContentType, Arc<dyn FileLoader>)>) -> Self {
        Self {
            adapters: adapters.into_iter().collect(),
        }
    }

    /// PDF through `pdf_oxide`, text and markdown read as UTF-8.
    pub fn with_defaults() -> Self {
        let plain_text: Arc<dyn FileLoader> = Arc::new(PlainTextAdapter::new());
        Self::new(vec![
            (ContentType::Pdf, Arc::new(PdfAdapter::new())),
            (ContentType::Text, Arc::clone(&plain_text)),
            (ContentType::Markdown, plain_text),
        ])
    }

    pub fn supports(&self, content_type: ContentType) -> bool {
        self.adapters.contains_key(&content_type)
    }
}

#[async_trait]
impl FileLoader for CompositeFileLoader {
    async fn extract_pages(
        &self,
        data: &[u8],
        source: &SourceFile,
    ) -> Result<Vec<Page>, FileLoaderError> {
        let adapter = self.adapters.get(&source.content_type).ok_or_else(|| {
            FileLoaderError::UnsupportedContentType(source.content_type.as_mime().to_string())
        })?;

        adapter.extract_pages(data, source).await
    }
}
