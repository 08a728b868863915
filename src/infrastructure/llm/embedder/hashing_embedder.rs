use async_trait::async_trait;

use crate::application::ports::{Embedder, EmbedderError};
use crate::domain::Embedding;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Deterministic offline embedder: hashes character bigrams into a fixed
/// number of buckets and normalises the result. Texts sharing many bigrams
/// end up close under cosine similarity.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimensions: usize,
    model_id: String,
}

impl HashingEmbedder {
    pub fn new(dimensions: usize) -> Self {
        let dimensions = dimensions.max(1);
        Self {
            dimensions,
            model_id: format!("hashing-bigram-{dimensions}"),
        }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn vectorize(&self, text: &str) -> Embedding {
        let mut values = vec![0.0f32; self.dimensions];
        let chars: Vec<char> = text.chars().flat_map(char::to_lowercase).collect();

        match chars.as_slice() {
            [] => {}
            [single] => values[self.bucket(&[*single])] += 1.0,
            _ => {
                for pair in chars.windows(2) {
                    values[self.bucket(pair)] += 1.0;
                }
            }
        }

        Embedding::new(values).normalized()
    }

    fn bucket(&self, chars: &[char]) -> usize {
        let mut hash = FNV_OFFSET;
        for ch in chars {
            for byte in (*ch as u32).to_le_bytes() {
                hash ^= u64::from(byte);
                hash = hash.wrapping_mul(FNV_PRIME);
            }
        }
        (hash % self.dimensions as u64) as usize
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(256)
    }
}

#[async_trait]
impl Embedder for HashingEmbedder {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn embed(&self, text: &str) -> Result<Embedding, EmbedderError> {
        Ok(self.vectorize(text))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbedderError> {
        Ok(texts.iter().map(|text| self.vectorize(text)).collect())
    }
}
