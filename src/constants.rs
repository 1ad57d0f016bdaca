//! Cross-cutting, shared constants.
//!
//! # Dimension Invariant
//!
//! A catalog collection is built with one embedder and must be queried with an embedder of the
//! same output dimension. [`DEFAULT_EMBEDDING_DIM`] matches `BAAI/bge-m3`, the reference model.
//! Use [`validate_embedding_dim`] at module boundaries to reject mismatches before any search.

/// Output dimension of the reference embedding model (`BAAI/bge-m3`).
pub const DEFAULT_EMBEDDING_DIM: usize = 1024;

pub const DEFAULT_EMBEDDING_PROVIDER: &str = "huggingface";
pub const DEFAULT_EMBEDDING_MODEL: &str = "BAAI/bge-m3";

pub const DEFAULT_DB_NAME: &str = "finance_bge_m3";
pub const DEFAULT_COLLECTION_NAME: &str = "finance_terms";

/// Number of nearest neighbors returned per candidate.
pub const DEFAULT_SEARCH_LIMIT: usize = 5;

/// Upper bound on concurrent candidate resolutions within one request.
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

/// Candidates whose trimmed length is at or below this are discarded.
pub const MIN_CANDIDATE_CHARS: usize = 2;

/// Category assigned to every record by the catalog build job.
pub const DEFAULT_TERM_CATEGORY: &str = "FINTERM";

/// Placeholder for missing CSV cells.
pub const MISSING_CELL: &str = "NA";

pub const INGEST_BATCH_SIZE: usize = 1024;

/// Text embedded once to discover the embedder's output dimension.
pub const DIMENSION_PROBE_TEXT: &str = "Sample Financial Term";

pub const MAX_TERM_ID_LEN: usize = 50;
pub const MAX_TERM_NAME_LEN: usize = 500;
pub const MAX_TERM_CATEGORY_LEN: usize = 50;
pub const MAX_TERM_TYPE_LEN: usize = 50;
pub const MAX_DEFINITION_LEN: usize = 1000;
pub const MAX_SYNONYMS_LEN: usize = 1000;
pub const MAX_INPUT_FILE_LEN: usize = 500;

/// Error returned when an embedding dimension check fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DimValidationError {
    /// Embedding dimension cannot be zero.
    ZeroDimension,
    /// Runtime dimension does not match expected dimension.
    DimensionMismatch { expected: usize, actual: usize },
}

impl std::fmt::Display for DimValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroDimension => write!(f, "embedding dimension cannot be zero"),
            Self::DimensionMismatch { expected, actual } => {
                write!(
                    f,
                    "dimension mismatch: expected {}, got {}",
                    expected, actual
                )
            }
        }
    }
}

impl std::error::Error for DimValidationError {}

/// Validates that a runtime embedding dimension matches the expected dimension.
///
/// # Example
///
/// ```
/// use finstd::constants::{validate_embedding_dim, DEFAULT_EMBEDDING_DIM};
///
/// validate_embedding_dim(1024, DEFAULT_EMBEDDING_DIM).unwrap();
/// assert!(validate_embedding_dim(768, DEFAULT_EMBEDDING_DIM).is_err());
/// ```
pub fn validate_embedding_dim(actual: usize, expected: usize) -> Result<(), DimValidationError> {
    if actual == 0 {
        return Err(DimValidationError::ZeroDimension);
    }
    if actual != expected {
        return Err(DimValidationError::DimensionMismatch { expected, actual });
    }
    Ok(())
}
