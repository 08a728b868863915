use std::sync::Arc;

use crate::application::ports::Embedder;
use crate::presentation::config::{EmbeddingProvider, EmbeddingsSettings};

use super::{HashingEmbedder, OpenAiEmbedder};

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DASHSCOPE_BASE_URL: &str = "https://dashscope.aliyuncs.com/compatible-mode/v1";

pub struct EmbedderFactory;

#[derive(Debug, thiserror::Error)]
pub enum EmbedderFactoryError {
    #[error("missing API key: set embeddings.api_key or {0}")]
    MissingApiKey(&'static str),
}

impl EmbedderFactory {
    pub fn create(settings: &EmbeddingsSettings) -> Result<Arc<dyn Embedder>, EmbedderFactoryError> {
        match settings.provider {
            EmbeddingProvider::Mock => {
                let dimensions = settings.dimensions.unwrap_or(256);
                tracing::info!(dimensions, "Using hashing embedder");
                Ok(Arc::new(HashingEmbedder::new(dimensions)))
            }
            EmbeddingProvider::OpenAi | EmbeddingProvider::DashScope => {
                let (default_url, key_var) = match settings.provider {
                    EmbeddingProvider::OpenAi => (OPENAI_BASE_URL, "OPENAI_API_KEY"),
                    _ => (DASHSCOPE_BASE_URL, "DASHSCOPE_API_KEY"),
                };
                let api_key = resolve_api_key(settings.api_key.as_deref(), key_var)
                    .ok_or(EmbedderFactoryError::MissingApiKey(key_var))?;
                let base_url = settings.base_url.as_deref().unwrap_or(default_url);

                tracing::info!(model = %settings.model, base_url, "Using remote embedding model");
                Ok(Arc::new(OpenAiEmbedder::new(
                    base_url,
                    api_key,
                    settings.model.clone(),
                    settings.dimensions,
                )))
            }
        }
    }
}

/// Configured key first, then the provider's conventional environment variable.
pub(crate) fn resolve_api_key(configured: Option<&str>, env_var: &str) -> Option<String> {
    configured
        .filter(|key| !key.trim().is_empty())
        .map(str::to_string)
        .or_else(|| std::env::var(env_var).ok())
        .filter(|key| !key.trim().is_empty())
}
