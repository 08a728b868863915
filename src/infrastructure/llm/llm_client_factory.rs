use std::sync::Arc;
use std::time::Duration;

use crate::application::ports::{LlmClient, LlmClientError};
use crate::presentation::config::{LlmProvider, LlmSettings};

use super::embedder::{DASHSCOPE_BASE_URL, OPENAI_BASE_URL, resolve_api_key};
use super::{ScaffoldLlmClient, StreamingLlmClient};

pub fn create_llm_client(settings: &LlmSettings) -> Result<Arc<dyn LlmClient>, LlmClientError> {
    let timeout = Duration::from_secs(settings.request_timeout_seconds.max(1));

    let (base_url, key_var) = match settings.provider {
        LlmProvider::Scaffold => {
            tracing::info!(delay_ms = settings.scaffold_delay_ms, "Using scaffold chat model");
            return Ok(Arc::new(ScaffoldLlmClient::new(Duration::from_millis(
                settings.scaffold_delay_ms,
            ))));
        }
        LlmProvider::OpenAi => (
            settings.base_url.as_deref().unwrap_or(OPENAI_BASE_URL),
            "OPENAI_API_KEY",
        ),
        LlmProvider::DashScope => (
            settings.base_url.as_deref().unwrap_or(DASHSCOPE_BASE_URL),
            "DASHSCOPE_API_KEY",
        ),
        LlmProvider::Custom => (
            settings.base_url.as_deref().ok_or_else(|| {
                LlmClientError::Configuration("base_url required for custom provider".to_string())
            })?,
            "LLM_API_KEY",
        ),
    };

    let api_key = match resolve_api_key(settings.api_key.as_deref(), key_var) {
        Some(key) => key,
        // Self-hosted OpenAI-compatible servers often run without auth.
        None if settings.provider == LlmProvider::Custom => String::new(),
        None => {
            return Err(LlmClientError::Configuration(format!(
                "missing API key: set llm.api_key or {key_var}"
            )));
        }
    };

    tracing::info!(base_url, model = %settings.chat_model, "Using streaming chat model");
    Ok(Arc::new(StreamingLlmClient::new(base_url, api_key, timeout)?))
}
