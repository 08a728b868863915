use super::{DistanceMetric, Embedder};

/// Identifies a collection and the embedding model its vectors come from.
/// A collection only ever holds vectors of one model, compared with one metric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionConfig {
    pub name: String,
    pub embedding_model: String,
    pub distance_metric: DistanceMetric,
}

impl CollectionConfig {
    pub fn new(name: impl Into<String>, embedding_model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            embedding_model: embedding_model.into(),
            distance_metric: DistanceMetric::Cosine,
        }
    }

    /// Binds the collection to the model the given embedder reports.
    pub fn for_embedder(name: impl Into<String>, embedder: &dyn Embedder) -> Self {
        Self::new(name, embedder.model_id())
    }

    pub fn with_distance_metric(mut self, distance_metric: DistanceMetric) -> Self {
        self.distance_metric = distance_metric;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionInfo {
    pub name: String,
    pub embedding_model: String,
    pub dimensions: usize,
    pub distance_metric: DistanceMetric,
    pub record_count: usize,
}
