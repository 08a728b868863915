mod ingestion_service;
mod prompt_builder;
mod response_emitter;
mod retrieval_service;

pub use ingestion_service::{IngestionError, IngestionReport, IngestionService};
pub use prompt_builder::{NO_REFERENCE_NOTICE, NOT_FOUND_ANSWER, PromptBuilder};
pub use response_emitter::{DEFAULT_CHANNEL_CAPACITY, StreamEvent, spawn_generation};
pub use retrieval_service::{
    ChatStream, ContextStatus, QueryPipelineConfig, RetrievalError, RetrievalService,
    RetrievedContext, format_context,
};
