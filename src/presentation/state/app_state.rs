use std::sync::Arc;

use crate::application::ports::{LlmClient, VectorStore};
use crate::application::services::RetrievalService;

pub struct AppState<L: ?Sized, V: ?Sized>
where
    L: LlmClient,
    V: VectorStore,
{
    pub retrieval_service: Arc<RetrievalService<L, V>>,
}

impl<L: ?Sized, V: ?Sized> AppState<L, V>
where
    L: LlmClient,
    V: VectorStore,
{
    pub fn new(retrieval_service: Arc<RetrievalService<L, V>>) -> Self {
        Self { retrieval_service }
    }
}

impl<L: ?Sized, V: ?Sized> Clone for AppState<L, V>
where
    L: LlmClient,
    V: VectorStore,
{
    fn clone(&self) -> Self {
        Self {
            retrieval_service: Arc::clone(&self.retrieval_service),
        }
    }
}
