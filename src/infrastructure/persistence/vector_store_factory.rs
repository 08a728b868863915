use std::sync::Arc;

use crate::application::ports::{VectorStore, VectorStoreError};
use crate::presentation::config::{DatabaseSettings, VectorStoreBackend};

use super::{InMemoryVectorStore, PgVectorStore, create_pool};

pub async fn create_vector_store(
    backend: VectorStoreBackend,
    database: &DatabaseSettings,
) -> Result<Arc<dyn VectorStore>, VectorStoreError> {
    match backend {
        VectorStoreBackend::Memory => {
            tracing::info!("Using in-memory vector store");
            Ok(Arc::new(InMemoryVectorStore::new()))
        }
        VectorStoreBackend::Postgres => {
            let pool = create_pool(&database.url, database.max_connections).await?;
            let store = PgVectorStore::new(pool);
            store.migrate().await?;
            Ok(Arc::new(store))
        }
    }
}
