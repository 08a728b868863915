use std::time::Duration;

use async_trait::async_trait;

use crate::application::ports::{GenerationOptions, LlmClient, LlmClientError, LlmTokenStream};
use crate::domain::{ChatTurn, MessageRole};

const THINKING_DELAY: Duration = Duration::from_millis(500);

/// Stand-in model for exercising clients without a provider: after a short
/// pause it streams a canned reply one character at a time.
#[derive(Debug, Clone)]
pub struct ScaffoldLlmClient {
    thinking_delay: Duration,
    char_delay: Duration,
}

impl ScaffoldLlmClient {
    pub fn new(char_delay: Duration) -> Self {
        Self {
            thinking_delay: THINKING_DELAY,
            char_delay,
        }
    }

    pub fn with_thinking_delay(mut self, thinking_delay: Duration) -> Self {
        self.thinking_delay = thinking_delay;
        self
    }

    /// Text the scaffold streams back for a given message list.
    pub fn reply_for(messages: &[ChatTurn]) -> String {
        let question = messages
            .iter()
            .rev()
            .find(|turn| turn.role == MessageRole::User)
            .and_then(|turn| turn.content.lines().rev().find(|line| !line.trim().is_empty()))
            .unwrap_or_default()
            .trim();

        let earlier_turns = messages
            .iter()
            .filter(|turn| turn.role != MessageRole::System)
            .count()
            .saturating_sub(1);

        format!(
            "Hello! I received your question: \"{question}\". \
             Taking into account the {earlier_turns} earlier turns of our conversation, \
             this is a simulated reply streamed one character at a time."
        )
    }
}

#[async_trait]
impl LlmClient for ScaffoldLlmClient {
    async fn generate_stream(
        &self,
        messages: &[ChatTurn],
        _options: &GenerationOptions,
    ) -> Result<LlmTokenStream, LlmClientError> {
        let reply = Self::reply_for(messages);
        let thinking_delay = self.thinking_delay;
        let char_delay = self.char_delay;

        let stream = async_stream::stream! {
            tokio::time::sleep(thinking_delay).await;
            for ch in reply.chars() {
                yield Ok::<String, LlmClientError>(ch.to_string());
                tokio::time::sleep(char_delay).await;
            }
        };

        Ok(Box::pin(stream))
    }
}
