//! Builds the ingestion and query pipelines from loaded settings.

use std::path::PathBuf;
use std::sync::Arc;

use crate::application::ports::{
    CollectionConfig, Embedder, GenerationOptions, LlmClient, LlmClientError, TextSplitterError,
    VectorStore,
};
use crate::application::services::{
    IngestionError, IngestionReport, IngestionService, QueryPipelineConfig,
    RetrievalService,
};
use crate::infrastructure::llm::create_llm_client;
use crate::infrastructure::text_processing::{CompositeFileLoader, RecursiveCharacterSplitter};

use super::config::{Settings, VectorStoreBackend};

pub type FileIngestionService =
    IngestionService<CompositeFileLoader, dyn VectorStore, RecursiveCharacterSplitter>;

pub type ChatService = RetrievalService<dyn LlmClient, dyn VectorStore>;

pub fn build_ingestion_service(
    settings: &Settings,
    embedder: Arc<dyn Embedder>,
    vector_store: Arc<dyn VectorStore>,
    collection: CollectionConfig,
) -> Result<FileIngestionService, TextSplitterError> {
    let text_splitter = Arc::new(RecursiveCharacterSplitter::new(
        settings.chunking.chunk_size,
        settings.chunking.chunk_overlap,
    )?);

    Ok(IngestionService::new(
        Arc::new(CompositeFileLoader::with_defaults()),
        embedder,
        vector_store,
        text_splitter,
        collection,
        settings.embeddings.batch_size,
    ))
}

pub fn build_retrieval_service(
    settings: &Settings,
    embedder: Arc<dyn Embedder>,
    vector_store: Arc<dyn VectorStore>,
    collection: CollectionConfig,
) -> Result<Arc<ChatService>, LlmClientError> {
    let llm_client = create_llm_client(&settings.llm)?;

    let config = QueryPipelineConfig {
        collection,
        top_k: settings.retrieval.top_k,
        generation: GenerationOptions::new(settings.llm.chat_model.clone(), settings.llm.temperature)
            .with_max_tokens(settings.llm.max_tokens),
        system_persona: settings.chat.system_persona.clone(),
        failure_message: settings.chat.failure_message.clone(),
        channel_capacity: settings.chat.channel_capacity,
    };

    Ok(Arc::new(RetrievalService::new(
        embedder,
        llm_client,
        vector_store,
        config,
    )))
}

/// Ingests `files` into the store the query pipeline is about to use, so a
/// process-local backend starts with content.
pub async fn seed_collection(
    settings: &Settings,
    embedder: Arc<dyn Embedder>,
    vector_store: Arc<dyn VectorStore>,
    collection: CollectionConfig,
    files: &[PathBuf],
) -> Result<Vec<IngestionReport>, IngestionError> {
    if files.is_empty() {
        if settings.vector_store.backend == VectorStoreBackend::Memory {
            tracing::warn!("In-memory store starts empty; pass --ingest to load documents");
        }
        return Ok(Vec::new());
    }

    let service = build_ingestion_service(settings, embedder, vector_store, collection)?;
    let reports = service.ingest_files(files).await?;

    tracing::info!(
        files = reports.len(),
        chunks = reports.iter().map(|r| r.chunks).sum::<usize>(),
        collection = %service.collection().name,
        "Collection seeded"
    );
    Ok(reports)
}
