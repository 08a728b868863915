use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::application::ports::{
    CollectionConfig, Embedder, EmbedderError, FileLoader, FileLoaderError, TextSplitter,
    TextSplitterError, VectorStore, VectorStoreError,
};
use crate::domain::{Chunk, ContentType, Document, DocumentId, Embedding, IngestionState, SourceFile};

pub struct IngestionService<F: ?Sized, V: ?Sized, T: ?Sized>
where
    F: FileLoader,
    V: VectorStore,
    T: TextSplitter,
{
    file_loader: Arc<F>,
    embedder: Arc<dyn Embedder>,
    vector_store: Arc<V>,
    text_splitter: Arc<T>,
    collection: CollectionConfig,
    embed_batch_size: usize,
}

impl<F: ?Sized, V: ?Sized, T: ?Sized> IngestionService<F, V, T>
where
    F: FileLoader,
    V: VectorStore,
    T: TextSplitter,
{
    pub fn new(
        file_loader: Arc<F>,
        embedder: Arc<dyn Embedder>,
        vector_store: Arc<V>,
        text_splitter: Arc<T>,
        collection: CollectionConfig,
        embed_batch_size: usize,
    ) -> Self {
        Self {
            file_loader,
            embedder,
            vector_store,
            text_splitter,
            collection,
            embed_batch_size: embed_batch_size.max(1),
        }
    }

    pub fn collection(&self) -> &CollectionConfig {
        &self.collection
    }

    /// Ingests files one after another and stops at the first failure.
    /// Files ingested before the failure stay in the collection.
    pub async fn ingest_files(
        &self,
        paths: &[PathBuf],
    ) -> Result<Vec<IngestionReport>, IngestionError> {
        let mut reports = Vec::with_capacity(paths.len());
        for path in paths {
            reports.push(self.ingest_file(path).await?);
        }
        Ok(reports)
    }

    pub async fn ingest_file(&self, path: &Path) -> Result<IngestionReport, IngestionError> {
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let content_type = ContentType::from_path(path).ok_or_else(|| {
            FileLoaderError::UnsupportedContentType(path.display().to_string())
        })?;

        let data = tokio::fs::read(path)
            .await
            .map_err(|e| FileLoaderError::Unreadable {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        self.ingest(&data, filename, content_type).await
    }

    /// Runs one document through load, chunk, embed and write.
    #[tracing::instrument(skip(self, data), fields(collection = %self.collection.name, size = data.len()))]
    pub async fn ingest(
        &self,
        data: &[u8],
        filename: String,
        content_type: ContentType,
    ) -> Result<IngestionReport, IngestionError> {
        let source = SourceFile::new(filename, content_type, data.len() as u64);
        let mut run = IngestionRun::new(source.id, source.filename.clone());

        match self.run_stages(&mut run, data, source).await {
            Ok((pages, chunks)) => {
                run.advance(IngestionState::Done)?;
                tracing::info!(
                    document_id = %run.document_id.as_uuid(),
                    pages,
                    chunks,
                    "Document ingested"
                );
                Ok(run.into_report(pages, chunks, &self.collection.name))
            }
            Err(e) => {
                run.fail();
                tracing::error!(
                    error = %e,
                    stage = %e.stage(),
                    source = %run.source,
                    "Ingestion failed"
                );
                Err(e)
            }
        }
    }

    async fn run_stages(
        &self,
        run: &mut IngestionRun,
        data: &[u8],
        source: SourceFile,
    ) -> Result<(usize, usize), IngestionError> {
        run.advance(IngestionState::Loading)?;
        let pages = self.file_loader.extract_pages(data, &source).await?;
        let document = Document::new(source, pages);
        let page_count = document.pages.len();

        run.advance(IngestionState::Chunking)?;
        let chunks = self.text_splitter.split(&document).await?;
        tracing::debug!(chunks = chunks.len(), chars = document.total_chars(), "Document split");

        run.advance(IngestionState::Embedding)?;
        let embeddings = self.embed_chunks(&chunks).await?;

        run.advance(IngestionState::Writing)?;
        self.vector_store
            .write(&self.collection, &chunks, &embeddings)
            .await?;

        Ok((page_count, chunks.len()))
    }

    async fn embed_chunks(&self, chunks: &[Chunk]) -> Result<Vec<Embedding>, EmbedderError> {
        let mut embeddings = Vec::with_capacity(chunks.len());
        for batch in chunks.chunks(self.embed_batch_size) {
            let texts: Vec<&str> = batch.iter().map(|c| c.text.as_str()).collect();
            let vectors = self.embedder.embed_batch(&texts).await?;
            if vectors.len() != texts.len() {
                return Err(EmbedderError::CountMismatch {
                    expected: texts.len(),
                    actual: vectors.len(),
                });
            }
            embeddings.extend(vectors);
        }
        Ok(embeddings)
    }
}

struct IngestionRun {
    document_id: DocumentId,
    source: String,
    state: IngestionState,
    transitions: Vec<IngestionState>,
}

impl IngestionRun {
    fn new(document_id: DocumentId, source: String) -> Self {
        Self {
            document_id,
            source,
            state: IngestionState::Idle,
            transitions: vec![IngestionState::Idle],
        }
    }

    fn advance(&mut self, next: IngestionState) -> Result<(), IngestionError> {
        if !self.state.can_transition_to(next) {
            return Err(IngestionError::IllegalTransition {
                from: self.state,
                to: next,
            });
        }
        tracing::debug!(from = %self.state, to = %next, "Ingestion state changed");
        self.state = next;
        self.transitions.push(next);
        Ok(())
    }

    fn fail(&mut self) {
        if self.state.can_transition_to(IngestionState::Failed) {
            self.state = IngestionState::Failed;
            self.transitions.push(IngestionState::Failed);
        }
    }

    fn into_report(self, pages: usize, chunks: usize, collection: &str) -> IngestionReport {
        IngestionReport {
            document_id: self.document_id,
            source: self.source,
            collection: collection.to_string(),
            pages,
            chunks,
            transitions: self.transitions,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IngestionReport {
    pub document_id: DocumentId,
    pub source: String,
    pub collection: String,
    pub pages: usize,
    pub chunks: usize,
    /// Every state the run passed through, starting at `Idle`.
    pub transitions: Vec<IngestionState>,
}

#[derive(Debug, thiserror::Error)]
pub enum IngestionError {
    #[error("file loading: {0}")]
    FileLoading(#[from] FileLoaderError),
    #[error("text splitting: {0}")]
    Splitting(#[from] TextSplitterError),
    #[error("embedding: {0}")]
    Embedding(#[from] EmbedderError),
    #[error("storage: {0}")]
    Storage(#[from] VectorStoreError),
    #[error("illegal ingestion transition {from} -> {to}")]
    IllegalTransition {
        from: IngestionState,
        to: IngestionState,
    },
}

impl IngestionError {
    /// Stage the run was in when it failed.
    pub fn stage(&self) -> IngestionState {
        match self {
            IngestionError::FileLoading(_) => IngestionState::Loading,
            IngestionError::Splitting(_) => IngestionState::Chunking,
            IngestionError::Embedding(_) => IngestionState::Embedding,
            IngestionError::Storage(_) => IngestionState::Writing,
            IngestionError::IllegalTransition { from, .. } => *from,
        }
    }
}
