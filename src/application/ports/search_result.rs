use crate::domain::Chunk;

#[derive(Debug, Clone)]
pub struct SearchResult {
    pub chunk: Chunk,
    /// Similarity to the query under the collection's distance metric; higher is closer.
    pub score: f32,
}
