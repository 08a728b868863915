use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::mpsc;
use tracing::Instrument;

use crate::application::ports::{GenerationOptions, LlmClient};
use crate::domain::ChatTurn;

/// The producer never runs more than one fragment ahead of the consumer.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    Fragment(String),
    /// Terminal event carrying the apology shown to the user.
    Failed(String),
}

impl StreamEvent {
    pub fn text(&self) -> &str {
        match self {
            StreamEvent::Fragment(text) | StreamEvent::Failed(text) => text,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, StreamEvent::Failed(_))
    }
}

/// Runs the generation on its own task and hands fragments over a bounded
/// channel. Dropping the receiver stops the task before its next pull from
/// the model stream.
pub fn spawn_generation<L>(
    llm_client: Arc<L>,
    messages: Vec<ChatTurn>,
    options: GenerationOptions,
    failure_message: String,
    capacity: usize,
) -> mpsc::Receiver<StreamEvent>
where
    L: LlmClient + ?Sized + 'static,
{
    let (sender, receiver) = mpsc::channel(capacity.max(1));
    let span = tracing::info_span!("generation", model = %options.model_id);

    tokio::spawn(
        async move {
            produce(llm_client, messages, options, failure_message, sender).await;
        }
        .instrument(span),
    );

    receiver
}

async fn produce<L>(
    llm_client: Arc<L>,
    messages: Vec<ChatTurn>,
    options: GenerationOptions,
    failure_message: String,
    sender: mpsc::Sender<StreamEvent>,
) where
    L: LlmClient + ?Sized,
{
    let started = tokio::select! {
        biased;
        _ = sender.closed() => {
            tracing::info!("Consumer went away before generation started");
            return;
        }
        started = llm_client.generate_stream(&messages, &options) => started,
    };

    let mut token_stream = match started {
        Ok(stream) => stream,
        Err(e) => {
            tracing::error!(error = %e, "Generation failed to start");
            let _ = sender.send(StreamEvent::Failed(failure_message)).await;
            return;
        }
    };

    let mut fragments = 0usize;
    loop {
        let next = tokio::select! {
            biased;
            _ = sender.closed() => {
                tracing::info!(fragments, "Consumer went away, generation stopped");
                return;
            }
            next = token_stream.next() => next,
        };

        match next {
            Some(Ok(fragment)) => {
                if fragment.is_empty() {
                    continue;
                }
                fragments += 1;
                if sender.send(StreamEvent::Fragment(fragment)).await.is_err() {
                    tracing::info!(fragments, "Consumer went away, generation stopped");
                    return;
                }
            }
            Some(Err(e)) => {
                tracing::error!(error = %e, fragments, "Generation failed mid-stream");
                let _ = sender.send(StreamEvent::Failed(failure_message)).await;
                return;
            }
            None => {
                tracing::debug!(fragments, "Generation complete");
                return;
            }
        }
    }
}
