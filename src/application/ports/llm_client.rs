use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use crate::domain::ChatTurn;

pub type LlmTokenStream = Pin<Box<dyn Stream<Item = Result<String, LlmClientError>> + Send>>;

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOptions {
    pub model_id: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

impl GenerationOptions {
    pub fn new(model_id: impl Into<String>, temperature: f32) -> Self {
        Self {
            model_id: model_id.into(),
            temperature,
            max_tokens: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Starts a generation and returns its text fragments as they arrive.
    async fn generate_stream(
        &self,
        messages: &[ChatTurn],
        options: &GenerationOptions,
    ) -> Result<LlmTokenStream, LlmClientError>;
}

#[derive(Debug, thiserror::Error)]
pub enum LlmClientError {
    #[error("api request failed: {0}")]
    ApiRequestFailed(String),
    #[error("rate limited")]
    RateLimited,
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("stream interrupted: {0}")]
    StreamInterrupted(String),
    #[error("llm client misconfigured: {0}")]
    Configuration(String),
}
