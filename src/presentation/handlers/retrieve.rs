use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::application::ports::{LlmClient, VectorStore};
use crate::application::services::format_context;
use crate::infrastructure::observability::sanitize_prompt;
use crate::presentation::state::AppState;

use super::error_response::error_response;

#[derive(Deserialize)]
pub struct RetrieveRequest {
    pub query: String,
}

#[derive(Serialize)]
pub struct RetrieveResponse {
    pub context: String,
    pub sources: Vec<SourceChunk>,
}

#[derive(Serialize)]
pub struct SourceChunk {
    pub text: String,
    pub source: String,
    pub page: Option<u32>,
    pub score: f32,
}

/// Retrieval only: the context the model would see for this query.
#[tracing::instrument(skip(state, request))]
pub async fn retrieve_handler<L, V>(
    State(state): State<AppState<L, V>>,
    Json(request): Json<RetrieveRequest>,
) -> Response
where
    L: LlmClient + ?Sized + 'static,
    V: VectorStore + ?Sized + 'static,
{
    let question = request.query.trim();
    if question.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "query must not be empty");
    }

    tracing::debug!(question = %sanitize_prompt(question), "Processing retrieval");

    match state.retrieval_service.retrieve(question).await {
        Ok(results) => {
            tracing::info!(sources_count = results.len(), "Retrieval successful");
            let context = format_context(&results);
            let sources = results
                .into_iter()
                .map(|r| SourceChunk {
                    text: r.chunk.text,
                    source: r.chunk.source,
                    page: r.chunk.page,
                    score: r.score,
                })
                .collect();

            (StatusCode::OK, Json(RetrieveResponse { context, sources })).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Retrieval failed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Retrieval failed: {}", e),
            )
        }
    }
}
