use async_trait::async_trait;

use crate::application::ports::{FileLoader, FileLoaderError};
use crate::domain::{ContentType, Page, SourceFile};

const UTF8_BOM: &str = "\u{feff}";

/// Loads UTF-8 text and markdown files as a single page.
#[derive(Debug, Default)]
pub struct PlainTextAdapter;

impl PlainTextAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FileLoader for PlainTextAdapter {
    async fn extract_pages(
        &self,
        data: &[u8],
        source: &SourceFile,
    ) -> Result<Vec<Page>, FileLoaderError> {
        if !matches!(source.content_type, ContentType::Text | ContentType::Markdown) {
            return Err(FileLoaderError::UnsupportedContentType(
                source.content_type.as_mime().to_string(),
            ));
        }

        let text = std::str::from_utf8(data)
            .map_err(|e| FileLoaderError::ExtractionFailed(format!("invalid UTF-8: {e}")))?;
        let text = text.strip_prefix(UTF8_BOM).unwrap_or(text);

        if text.trim().is_empty() {
            return Err(FileLoaderError::NoTextFound(source.filename.clone()));
        }

        Ok(vec![Page::new(1, text.replace("\r\n", "\n"))])
    }
}
