//! Deterministic hashed embedder for tests and local runs.

use tracing::debug;

use super::Embedder;
use super::config::{EmbeddingConfig, EmbeddingProvider};
use super::error::EmbeddingError;
use crate::constants::{DEFAULT_EMBEDDING_DIM, DEFAULT_EMBEDDING_MODEL};

/// Produces unit-length pseudo-random vectors seeded by a BLAKE3 hash of the text.
///
/// Identical text always maps to the identical vector, across processes and
/// toolchain versions. Distinct texts are unrelated, so distances carry no meaning
/// beyond exact-match (distance `0.0`).
#[derive(Debug, Clone)]
pub struct StubEmbedder {
    provider: EmbeddingProvider,
    model: String,
    dimension: usize,
}

impl StubEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            provider: EmbeddingProvider::HuggingFace,
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
            dimension,
        }
    }

    /// Creates a stub that reports the given provider and model as its identity.
    pub fn with_identity(provider: EmbeddingProvider, model: &str, dimension: usize) -> Self {
        Self {
            provider,
            model: model.to_string(),
            dimension,
        }
    }

    pub fn from_config(config: &EmbeddingConfig) -> Self {
        Self::with_identity(
            config.provider,
            &config.model,
            config.dimension.unwrap_or(DEFAULT_EMBEDDING_DIM),
        )
    }

    /// Embeds one string synchronously.
    pub fn embed_one(&self, text: &str) -> Vec<f32> {
        debug!(text_len = text.len(), "Generating stub embedding");

        let digest = blake3::hash(text.as_bytes());
        let mut seed_bytes = [0u8; 8];
        seed_bytes.copy_from_slice(&digest.as_bytes()[..8]);
        let mut state = u64::from_le_bytes(seed_bytes);

        let mut embedding = Vec::with_capacity(self.dimension);
        for _ in 0..self.dimension {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
            let value = ((state >> 32) as f32 / u32::MAX as f32) * 2.0 - 1.0;
            embedding.push(value);
        }

        l2_normalize(&mut embedding);
        embedding
    }
}

impl Default for StubEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_EMBEDDING_DIM)
    }
}

impl Embedder for StubEmbedder {
    fn provider(&self) -> EmbeddingProvider {
        self.provider
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(texts.iter().map(|text| self.embed_one(text)).collect())
    }
}

/// Scales `vector` to unit length in place. Zero vectors are left untouched.
pub fn l2_normalize(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in vector.iter_mut() {
            *x /= norm;
        }
    }
}
