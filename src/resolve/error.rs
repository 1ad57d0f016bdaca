use thiserror::Error;

use crate::embedding::EmbeddingError;
use crate::vectordb::VectorDbError;

/// Failure to resolve a single candidate.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The candidate could not be embedded, or its vector had the wrong dimension.
    #[error("embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    /// The catalog search failed.
    #[error("search failed: {0}")]
    Search(#[from] VectorDbError),
}

pub type ResolveResult<T> = Result<T, ResolveError>;
