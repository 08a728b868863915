use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;

use crate::application::ports::{LlmClient, VectorStore};
use crate::presentation::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Serialize)]
pub struct ReadinessResponse {
    pub status: &'static str,
    pub collection: String,
    pub embedding_model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Liveness: the process is up and serving.
pub async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse { status: "healthy" }))
}

/// Readiness: the vector store answers. An absent collection is still ready,
/// queries against it just return no context.
pub async fn readiness_handler<L, V>(State(state): State<AppState<L, V>>) -> impl IntoResponse
where
    L: LlmClient + ?Sized + 'static,
    V: VectorStore + ?Sized + 'static,
{
    let collection = state.retrieval_service.collection();
    let mut response = ReadinessResponse {
        status: "ready",
        collection: collection.name.clone(),
        embedding_model: collection.embedding_model.clone(),
        records: None,
        error: None,
    };

    match state.retrieval_service.collection_info().await {
        Ok(info) => {
            response.records = Some(info.map_or(0, |i| i.record_count));
            (StatusCode::OK, Json(response))
        }
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            response.status = "unavailable";
            response.error = Some(e.to_string());
            (StatusCode::SERVICE_UNAVAILABLE, Json(response))
        }
    }
}
