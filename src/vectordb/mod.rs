//! Term catalog storage (Qdrant-backed, with an in-memory mock).

pub mod client;
pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod model;

#[cfg(test)]
mod tests;

pub use client::{CatalogStore, QdrantCatalog};
pub use error::VectorDbError;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockCatalogStore;
pub use model::{
    CollectionSchema, DistanceMetric, IndexParams, IndexType, InsertSummary, TermAttributes,
    TermField, TermFilter, TermHit, TermRecord, cosine_similarity, generate_point_id,
};

/// Physical collection name for a logical `(db_name, collection_name)` pair.
pub fn qualified_collection_name(db_name: &str, collection_name: &str) -> String {
    format!("{}__{}", db_name, collection_name)
}
