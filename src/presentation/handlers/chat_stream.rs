use std::convert::Infallible;

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use crate::application::ports::{LlmClient, VectorStore};
use crate::domain::{ChatTurn, MessageRole};
use crate::infrastructure::observability::sanitize_prompt;
use crate::presentation::state::AppState;

use super::error_response::error_response;

#[derive(Debug, Deserialize)]
pub struct ChatStreamRequest {
    pub query: String,
    #[serde(default)]
    pub history: Vec<ChatTurnPayload>,
}

/// A history entry as it arrives on the wire, before its role is checked.
#[derive(Debug, Deserialize)]
pub struct ChatTurnPayload {
    pub role: String,
    pub content: String,
}

impl TryFrom<ChatTurnPayload> for ChatTurn {
    type Error = String;

    fn try_from(payload: ChatTurnPayload) -> Result<Self, Self::Error> {
        let role: MessageRole = payload.role.parse()?;
        Ok(ChatTurn::new(role, payload.content))
    }
}

/// SSE field values may not hold carriage returns; every line break becomes `\n`.
fn normalize_line_breaks(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

#[tracing::instrument(skip(state, request), fields(history = request.history.len()))]
pub async fn chat_stream_handler<L, V>(
    State(state): State<AppState<L, V>>,
    Json(request): Json<ChatStreamRequest>,
) -> Response
where
    L: LlmClient + ?Sized + 'static,
    V: VectorStore + ?Sized + 'static,
{
    let question = request.query.trim().to_string();
    if question.is_empty() {
        tracing::warn!("Chat request with empty query");
        return error_response(StatusCode::BAD_REQUEST, "query must not be empty");
    }

    let history = match request
        .history
        .into_iter()
        .map(ChatTurn::try_from)
        .collect::<Result<Vec<_>, _>>()
    {
        Ok(history) => history,
        Err(e) => {
            tracing::warn!(error = %e, "Chat request with invalid history");
            return error_response(StatusCode::BAD_REQUEST, e);
        }
    };

    tracing::debug!(prompt = %sanitize_prompt(&question), "Processing chat request");

    let chat = state
        .retrieval_service
        .query_stream(&question, &history)
        .await;
    tracing::info!(
        context_status = ?chat.context.status,
        sources = chat.context.sources.len(),
        "Streaming answer"
    );

    let mut events = chat.events;
    let sse_stream = async_stream::stream! {
        while let Some(event) = events.recv().await {
            if event.is_failure() {
                tracing::warn!("Answer stream closed with failure event");
            }
            yield Ok::<_, Infallible>(Event::default().data(normalize_line_breaks(event.text())));
        }
    };

    (
        [(
            HeaderName::from_static("x-accel-buffering"),
            HeaderValue::from_static("no"),
        )],
        Sse::new(sse_stream),
    )
        .into_response()
}
