use thiserror::Error;

use crate::embedding::EmbeddingProvider;
use crate::vectordb::VectorDbError;

#[derive(Debug, Error)]
/// Request-level standardization failures.
///
/// Per-candidate failures never surface here; they are logged and the
/// candidate is omitted from the report.
pub enum StandardizeError {
    /// The handle names a different embedding provider or model than the one in use.
    #[error(
        "catalog handle expects {handle_provider}/{handle_model}, embedder is {embedder_provider}/{embedder_model}"
    )]
    IncompatibleHandle {
        handle_provider: EmbeddingProvider,
        handle_model: String,
        embedder_provider: EmbeddingProvider,
        embedder_model: String,
    },

    /// The collection was built at a different vector dimension.
    #[error("collection '{collection}' stores {stored}-dim vectors, embedder produces {embedder}")]
    DimensionMismatch {
        collection: String,
        stored: usize,
        embedder: usize,
    },

    #[error("catalog error: {0}")]
    Catalog(#[from] VectorDbError),
}

impl StandardizeError {
    /// Returns `true` for caller or deployment misconfiguration.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            StandardizeError::IncompatibleHandle { .. } | StandardizeError::DimensionMismatch { .. }
        )
    }
}

pub type StandardizeResult<T> = Result<T, StandardizeError>;
