use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::application::ports::{
    CollectionConfig, CollectionInfo, DistanceMetric, SearchResult, VectorStore, VectorStoreError,
};
use crate::domain::{Chunk, ChunkId, DocumentId, Embedding};

/// [`VectorStore`] on PostgreSQL with the pgvector extension. Collections are
/// rows of `rag_collections`; their records live in `rag_embeddings`, ordered
/// by the `seq` column.
#[derive(Clone)]
pub struct PgVectorStore {
    pool: PgPool,
}

/// Identity columns of a `rag_collections` row.
struct StoredCollection {
    embedding_model: String,
    dimensions: i32,
    distance_metric: DistanceMetric,
}

impl StoredCollection {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        let metric: String = row.try_get("distance_metric")?;
        let distance_metric = metric.parse().map_err(|e: String| sqlx::Error::ColumnDecode {
            index: "distance_metric".to_string(),
            source: e.into(),
        })?;

        Ok(Self {
            embedding_model: row.try_get("embedding_model")?,
            dimensions: row.try_get("dimensions")?,
            distance_metric,
        })
    }
}

/// pgvector's text input format: `[1,2,3]`.
fn vector_literal(embedding: &Embedding) -> String {
    let values: Vec<String> = embedding.values.iter().map(|v| v.to_string()).collect();
    format!("[{}]", values.join(","))
}

fn score_sql(metric: DistanceMetric) -> (&'static str, &'static str) {
    match metric {
        DistanceMetric::Cosine => ("<=>", "1 - (embedding <=> $2::vector)"),
        DistanceMetric::DotProduct => ("<#>", "-(embedding <#> $2::vector)"),
        DistanceMetric::Euclidean => ("<->", "-(embedding <-> $2::vector)"),
    }
}

impl PgVectorStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the pgvector extension and tables if missing.
    pub async fn migrate(&self) -> Result<(), VectorStoreError> {
        sqlx::migrate!()
            .run(&self.pool)
            .await
            .map_err(|e| VectorStoreError::ConnectionFailed(format!("migration failed: {e}")))?;
        tracing::info!("Vector store migrations applied");
        Ok(())
    }

    fn check_collection(
        collection: &CollectionConfig,
        stored: &StoredCollection,
        actual_dimensions: usize,
    ) -> Result<(), VectorStoreError> {
        if stored.embedding_model != collection.embedding_model {
            return Err(VectorStoreError::EmbeddingModelMismatch {
                collection: collection.name.clone(),
                expected: stored.embedding_model.clone(),
                actual: collection.embedding_model.clone(),
            });
        }
        if stored.distance_metric != collection.distance_metric {
            return Err(VectorStoreError::DistanceMetricMismatch {
                collection: collection.name.clone(),
                expected: stored.distance_metric,
                actual: collection.distance_metric,
            });
        }
        if stored.dimensions as usize != actual_dimensions {
            return Err(VectorStoreError::DimensionMismatch {
                expected: stored.dimensions as usize,
                actual: actual_dimensions,
            });
        }
        Ok(())
    }

    fn row_to_result(row: &PgRow, collection: &str) -> Result<SearchResult, sqlx::Error> {
        let page: Option<i32> = row.try_get("page")?;
        let offset: i64 = row.try_get("char_offset")?;
        let score: f64 = row.try_get("score")?;

        let chunk = Chunk {
            id: ChunkId::from_uuid(row.try_get("id")?),
            text: row.try_get("text")?,
            document_id: DocumentId::from_uuid(row.try_get("document_id")?),
            source: row.try_get("source")?,
            page: page.map(|p| p as u32),
            offset: offset as usize,
        };

        tracing::trace!(collection, chunk_id = %chunk.id.as_uuid(), score, "Row matched");
        Ok(SearchResult {
            chunk,
            score: score as f32,
        })
    }
}

#[async_trait]
impl VectorStore for PgVectorStore {
    #[tracing::instrument(skip(self, chunks, embeddings), fields(collection = %collection.name, batch = chunks.len()))]
    async fn write(
        &self,
        collection: &CollectionConfig,
        chunks: &[Chunk],
        embeddings: &[Embedding],
    ) -> Result<(), VectorStoreError> {
        if chunks.len() != embeddings.len() {
            return Err(VectorStoreError::WriteFailed(format!(
                "{} chunks but {} embeddings",
                chunks.len(),
                embeddings.len()
            )));
        }
        let Some(first) = embeddings.first() else {
            return Ok(());
        };
        let dimensions = first.dimensions();
        if let Some(odd) = embeddings.iter().find(|e| e.dimensions() != dimensions) {
            return Err(VectorStoreError::DimensionMismatch {
                expected: dimensions,
                actual: odd.dimensions(),
            });
        }

        let write_failed = |e: sqlx::Error| VectorStoreError::WriteFailed(e.to_string());
        let mut tx = self.pool.begin().await.map_err(write_failed)?;

        sqlx::query(
            "INSERT INTO rag_collections (name, embedding_model, dimensions, distance_metric) \
             VALUES ($1, $2, $3, $4) ON CONFLICT (name) DO NOTHING",
        )
        .bind(&collection.name)
        .bind(&collection.embedding_model)
        .bind(dimensions as i32)
        .bind(collection.distance_metric.as_str())
        .execute(&mut *tx)
        .await
        .map_err(write_failed)?;

        // Row lock serialises concurrent writers to the same collection.
        let row = sqlx::query(
            "SELECT embedding_model, dimensions, distance_metric \
             FROM rag_collections WHERE name = $1 FOR UPDATE",
        )
        .bind(&collection.name)
        .fetch_one(&mut *tx)
        .await
        .map_err(write_failed)?;
        let stored = StoredCollection::from_row(&row).map_err(write_failed)?;

        Self::check_collection(collection, &stored, dimensions)?;

        for (chunk, embedding) in chunks.iter().zip(embeddings) {
            let metadata = serde_json::json!({
                "source": chunk.source,
                "page": chunk.page,
            });

            sqlx::query(
                "INSERT INTO rag_embeddings \
                 (id, collection, document_id, source, page, char_offset, text, embedding, metadata) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8::vector, $9)",
            )
            .bind(chunk.id.as_uuid())
            .bind(&collection.name)
            .bind(chunk.document_id.as_uuid())
            .bind(&chunk.source)
            .bind(chunk.page.map(|p| p as i32))
            .bind(chunk.offset as i64)
            .bind(&chunk.text)
            .bind(vector_literal(embedding))
            .bind(metadata)
            .execute(&mut *tx)
            .await
            .map_err(write_failed)?;
        }

        tx.commit().await.map_err(write_failed)?;
        tracing::debug!("Batch committed");
        Ok(())
    }

    #[tracing::instrument(skip(self, embedding), fields(collection = %collection.name))]
    async fn query(
        &self,
        collection: &CollectionConfig,
        embedding: &Embedding,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, VectorStoreError> {
        if top_k == 0 {
            return Err(VectorStoreError::InvalidTopK);
        }

        let query_failed = |e: sqlx::Error| VectorStoreError::QueryFailed(e.to_string());

        let Some(row) = sqlx::query(
            "SELECT embedding_model, dimensions, distance_metric FROM rag_collections WHERE name = $1",
        )
        .bind(&collection.name)
        .fetch_optional(&self.pool)
        .await
        .map_err(query_failed)?
        else {
            return Ok(Vec::new());
        };
        let stored = StoredCollection::from_row(&row).map_err(query_failed)?;
        Self::check_collection(collection, &stored, embedding.dimensions())?;

        let (operator, score) = score_sql(collection.distance_metric);
        let sql = format!(
            "SELECT id, document_id, source, page, char_offset, text, ({score})::float8 AS score \
             FROM rag_embeddings \
             WHERE collection = $1 \
             ORDER BY embedding {operator} $2::vector, seq ASC \
             LIMIT $3"
        );

        let rows = sqlx::query(&sql)
            .bind(&collection.name)
            .bind(vector_literal(embedding))
            .bind(top_k as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(query_failed)?;

        rows.iter()
            .map(|row| Self::row_to_result(row, &collection.name))
            .collect::<Result<Vec<_>, _>>()
            .map_err(query_failed)
    }

    async fn collection_info(&self, name: &str) -> Result<Option<CollectionInfo>, VectorStoreError> {
        let row = sqlx::query(
            "SELECT c.embedding_model, c.dimensions, c.distance_metric, COUNT(e.seq) AS record_count \
             FROM rag_collections c \
             LEFT JOIN rag_embeddings e ON e.collection = c.name \
             WHERE c.name = $1 \
             GROUP BY c.name, c.embedding_model, c.dimensions, c.distance_metric",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| VectorStoreError::QueryFailed(e.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let read = |e: sqlx::Error| VectorStoreError::QueryFailed(e.to_string());
        let stored = StoredCollection::from_row(&row).map_err(read)?;
        let record_count: i64 = row.try_get("record_count").map_err(read)?;

        Ok(Some(CollectionInfo {
            name: name.to_string(),
            embedding_model: stored.embedding_model,
            dimensions: stored.dimensions as usize,
            distance_metric: stored.distance_metric,
            record_count: record_count as usize,
        }))
    }

    async fn delete_collection(&self, name: &str) -> Result<(), VectorStoreError> {
        sqlx::query("DELETE FROM rag_collections WHERE name = $1")
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(|e| VectorStoreError::CollectionDeletionFailed(e.to_string()))?;

        tracing::info!(collection = name, "Collection deleted");
        Ok(())
    }
}
