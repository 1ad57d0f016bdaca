//! Text embedding.
//!
//! - [`Embedder`] is the capability the resolver and the catalog build job depend on.
//! - [`HttpEmbedder`] talks to a remote embedding service.
//! - [`StubEmbedder`] is deterministic and needs no service (tests, local runs).
//! - [`TermEmbedder`] picks one of the two from an [`EmbeddingConfig`].

pub mod config;
mod error;
pub mod http;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod stub;


pub use config::{DEFAULT_EMBEDDING_TIMEOUT_SECS, EmbeddingConfig, EmbeddingProvider};
pub use error::EmbeddingError;
pub use http::HttpEmbedder;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockEmbedder;
pub use stub::{StubEmbedder, l2_normalize};

use std::future::Future;

use tracing::warn;

/// Maps text to fixed-length dense vectors.
///
/// Implementations must return one vector per input, in input order, each of
/// length [`dimension`](Embedder::dimension), and must be deterministic for a
/// fixed model version.
pub trait Embedder: Send + Sync {
    /// Provider the vectors come from.
    fn provider(&self) -> EmbeddingProvider;

    /// Model name the vectors come from.
    fn model(&self) -> &str;

    /// Output vector length.
    fn dimension(&self) -> usize;

    /// Embeds a batch of texts.
    fn embed(
        &self,
        texts: &[&str],
    ) -> impl Future<Output = Result<Vec<Vec<f32>>, EmbeddingError>> + Send;

    /// Embeds a single query text.
    fn embed_query(
        &self,
        text: &str,
    ) -> impl Future<Output = Result<Vec<f32>, EmbeddingError>> + Send {
        async move {
            let vector = self
                .embed(&[text])
                .await?
                .pop()
                .ok_or_else(|| EmbeddingError::InvalidResponse {
                    reason: "no embedding returned for query".to_string(),
                })?;

            if vector.len() != self.dimension() {
                return Err(EmbeddingError::DimensionMismatch {
                    expected: self.dimension(),
                    actual: vector.len(),
                });
            }
            Ok(vector)
        }
    }
}

/// Embedder selected at startup from configuration.
pub enum TermEmbedder {
    Http(HttpEmbedder),
    Stub(StubEmbedder),
}

impl std::fmt::Debug for TermEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TermEmbedder")
            .field("backend", &if self.is_stub() { "stub" } else { "http" })
            .field("provider", &self.provider())
            .field("model", &self.model())
            .field("dimension", &self.dimension())
            .finish()
    }
}

impl TermEmbedder {
    /// Builds the embedder described by `config` (stub mode is supported).
    pub async fn load(config: EmbeddingConfig) -> Result<Self, EmbeddingError> {
        config.validate()?;

        if config.testing_stub {
            warn!("Embedder running in STUB mode (testing only)");
            return Ok(TermEmbedder::Stub(StubEmbedder::from_config(&config)));
        }

        Ok(TermEmbedder::Http(HttpEmbedder::connect(config).await?))
    }

    /// Returns `true` if running in stub mode.
    pub fn is_stub(&self) -> bool {
        matches!(self, TermEmbedder::Stub(_))
    }
}

impl Embedder for TermEmbedder {
    fn provider(&self) -> EmbeddingProvider {
        match self {
            TermEmbedder::Http(e) => e.provider(),
            TermEmbedder::Stub(e) => e.provider(),
        }
    }

    fn model(&self) -> &str {
        match self {
            TermEmbedder::Http(e) => e.model(),
            TermEmbedder::Stub(e) => e.model(),
        }
    }

    fn dimension(&self) -> usize {
        match self {
            TermEmbedder::Http(e) => e.dimension(),
            TermEmbedder::Stub(e) => e.dimension(),
        }
    }

    async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        match self {
            TermEmbedder::Http(e) => e.embed(texts).await,
            TermEmbedder::Stub(e) => e.embed(texts).await,
        }
    }
}
