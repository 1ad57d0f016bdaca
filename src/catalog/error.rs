use std::path::PathBuf;

use thiserror::Error;

use crate::constants::DimValidationError;
use crate::embedding::EmbeddingError;
use crate::vectordb::VectorDbError;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("failed to read glossary {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("row {row} rejected: {source}")]
    InvalidRow {
        row: usize,
        #[source]
        source: VectorDbError,
    },

    #[error("dimension probe failed: {0}")]
    Probe(#[from] EmbeddingError),

    #[error("embedder reports {declared} dims but produced {actual}")]
    ProbeMismatch { declared: usize, actual: usize },

    #[error("store error: {0}")]
    Store(#[from] VectorDbError),
}

impl IngestError {
    pub(crate) fn from_probe(declared: usize, err: DimValidationError) -> Self {
        match err {
            DimValidationError::ZeroDimension => IngestError::ProbeMismatch {
                declared,
                actual: 0,
            },
            DimValidationError::DimensionMismatch { actual, .. } => {
                IngestError::ProbeMismatch { declared, actual }
            }
        }
    }
}

pub type IngestResult<T> = Result<T, IngestError>;
