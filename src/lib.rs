//! Financial term standardization library (used by the server, the catalog
//! build job and integration tests).
//!
//! # Public API Surface
//!
//! ## Core Types
//! - [`Config`], [`ConfigError`] - Server configuration
//! - [`Standardizer`], [`CatalogSession`], [`CatalogHandle`] - Whole-text standardization
//! - [`StandardizationReport`], [`StandardizedTerm`], [`TermMatch`] - Results
//!
//! ## Pipeline Stages
//! - [`CandidateExtractor`] - Candidate phrase extraction
//! - [`Embedder`], [`TermEmbedder`], [`EmbeddingConfig`] - Text embedding
//! - [`TermResolver`] - Nearest-neighbor lookup for one candidate
//!
//! ## Catalog Store
//! - [`CatalogStore`], [`QdrantCatalog`] - Vector store contract and Qdrant backend
//! - [`CatalogBuilder`], [`IngestReport`] - Glossary ingestion
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod catalog;
pub mod config;
pub mod constants;
pub mod embedding;
pub mod extract;
pub mod gateway;
pub mod resolve;
pub mod standardize;
pub mod vectordb;

pub use catalog::{CatalogBuilder, GlossaryRow, IngestError, IngestReport};
pub use config::{Config, ConfigError};
pub use constants::{DimValidationError, validate_embedding_dim};
pub use embedding::{
    Embedder, EmbeddingConfig, EmbeddingError, EmbeddingProvider, HttpEmbedder, StubEmbedder,
    TermEmbedder,
};
pub use extract::{CandidateExtractor, extract_candidates};
pub use resolve::{ResolveError, ResolveOptions, TermMatch, TermResolver};
pub use standardize::{
    CatalogHandle, CatalogSession, CollectionLeases, SessionState, StandardizationReport, StandardizeError,
    StandardizeOptions, StandardizedTerm, Standardizer,
};
pub use vectordb::{
    CatalogStore, CollectionSchema, DistanceMetric, QdrantCatalog, TermAttributes, TermFilter,
    TermHit, TermRecord, VectorDbError, qualified_collection_name,
};

#[cfg(any(test, feature = "mock"))]
pub use embedding::MockEmbedder;
#[cfg(any(test, feature = "mock"))]
pub use vectordb::MockCatalogStore;
