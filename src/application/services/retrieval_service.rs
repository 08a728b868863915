use std::sync::Arc;

use tokio::sync::mpsc;

use super::prompt_builder::PromptBuilder;
use super::response_emitter::{StreamEvent, spawn_generation};
use crate::application::ports::{
    CollectionConfig, CollectionInfo, Embedder, EmbedderError, GenerationOptions, LlmClient, SearchResult,
    VectorStore, VectorStoreError,
};
use crate::domain::ChatTurn;

/// Static per-process settings of the query pipeline.
#[derive(Debug, Clone)]
pub struct QueryPipelineConfig {
    pub collection: CollectionConfig,
    pub top_k: usize,
    pub generation: GenerationOptions,
    pub system_persona: Option<String>,
    pub failure_message: String,
    pub channel_capacity: usize,
}

pub struct RetrievalService<L: ?Sized, V: ?Sized>
where
    L: LlmClient,
    V: VectorStore,
{
    embedder: Arc<dyn Embedder>,
    llm_client: Arc<L>,
    vector_store: Arc<V>,
    prompt_builder: PromptBuilder,
    config: QueryPipelineConfig,
}

impl<L: ?Sized, V: ?Sized> RetrievalService<L, V>
where
    L: LlmClient + 'static,
    V: VectorStore,
{
    pub fn new(
        embedder: Arc<dyn Embedder>,
        llm_client: Arc<L>,
        vector_store: Arc<V>,
        config: QueryPipelineConfig,
    ) -> Self {
        let prompt_builder = PromptBuilder::new(config.system_persona.clone());
        Self {
            embedder,
            llm_client,
            vector_store,
            prompt_builder,
            config,
        }
    }

    pub fn collection(&self) -> &CollectionConfig {
        &self.config.collection
    }

    pub async fn collection_info(&self) -> Result<Option<CollectionInfo>, VectorStoreError> {
        self.vector_store
            .collection_info(&self.config.collection.name)
            .await
    }

    /// Embeds the question and returns the `top_k` closest chunks.
    #[tracing::instrument(skip(self, question), fields(collection = %self.config.collection.name, top_k = self.config.top_k))]
    pub async fn retrieve(&self, question: &str) -> Result<Vec<SearchResult>, RetrievalError> {
        let query_embedding = self
            .embedder
            .embed(question)
            .await
            .map_err(RetrievalError::Embedding)?;

        let results = self
            .vector_store
            .query(&self.config.collection, &query_embedding, self.config.top_k)
            .await
            .map_err(RetrievalError::Search)?;

        tracing::debug!(hits = results.len(), "Retrieval finished");
        Ok(results)
    }

    /// Like [`retrieve`](Self::retrieve), but a failure turns into an
    /// unavailable context instead of an error.
    pub async fn build_context(&self, question: &str) -> RetrievedContext {
        match self.retrieve(question).await {
            Ok(results) => RetrievedContext::from_results(results),
            Err(e) => {
                tracing::warn!(error = %e, "Retrieval failed, answering without reference material");
                RetrievedContext::unavailable()
            }
        }
    }

    /// Runs the whole query pipeline and returns the live event stream of the answer.
    pub async fn query_stream(&self, question: &str, history: &[ChatTurn]) -> ChatStream {
        let context = self.build_context(question).await;
        let messages = self.prompt_builder.build(&context.text, question, history);

        tracing::debug!(
            messages = messages.len(),
            history = history.len(),
            context_status = ?context.status,
            "Prompt assembled"
        );

        let events = spawn_generation(
            Arc::clone(&self.llm_client),
            messages,
            self.config.generation.clone(),
            self.config.failure_message.clone(),
            self.config.channel_capacity,
        );

        ChatStream { context, events }
    }
}

/// Joins the matched chunk texts with a blank line, keeping retrieval order.
pub fn format_context(results: &[SearchResult]) -> String {
    results
        .iter()
        .map(|r| r.chunk.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextStatus {
    Found,
    Empty,
    Unavailable,
}

#[derive(Debug, Clone)]
pub struct RetrievedContext {
    pub text: String,
    pub sources: Vec<SearchResult>,
    pub status: ContextStatus,
}

impl RetrievedContext {
    pub fn from_results(sources: Vec<SearchResult>) -> Self {
        let text = format_context(&sources);
        let status = if sources.iter().all(|r| r.chunk.text.is_empty()) {
            ContextStatus::Empty
        } else {
            ContextStatus::Found
        };
        Self {
            text,
            sources,
            status,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            text: String::new(),
            sources: Vec::new(),
            status: ContextStatus::Unavailable,
        }
    }
}

pub struct ChatStream {
    pub context: RetrievedContext,
    pub events: mpsc::Receiver<StreamEvent>,
}

#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error("embedding: {0}")]
    Embedding(EmbedderError),
    #[error("search: {0}")]
    Search(#[from] VectorStoreError),
}
