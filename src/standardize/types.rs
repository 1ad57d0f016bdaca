use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::constants::{
    DEFAULT_COLLECTION_NAME, DEFAULT_DB_NAME, DEFAULT_EMBEDDING_MODEL, DEFAULT_MAX_CONCURRENCY,
};
use crate::embedding::EmbeddingProvider;
use crate::resolve::{ResolveOptions, TermMatch};
use crate::vectordb::qualified_collection_name;

/// Names the catalog collection a request resolves against, and the
/// embedding model it was built with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogHandle {
    pub provider: EmbeddingProvider,
    pub model: String,
    pub db_name: String,
    pub collection_name: String,
}

impl Default for CatalogHandle {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::HuggingFace,
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
            db_name: DEFAULT_DB_NAME.to_string(),
            collection_name: DEFAULT_COLLECTION_NAME.to_string(),
        }
    }
}

impl CatalogHandle {
    pub fn new(
        provider: EmbeddingProvider,
        model: &str,
        db_name: &str,
        collection_name: &str,
    ) -> Self {
        Self {
            provider,
            model: model.to_string(),
            db_name: db_name.to_string(),
            collection_name: collection_name.to_string(),
        }
    }

    /// Physical collection name in the store.
    pub fn qualified_name(&self) -> String {
        qualified_collection_name(&self.db_name, &self.collection_name)
    }
}

/// Matches for one candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardizedTerm {
    pub original_term: String,
    pub standardized_results: Vec<TermMatch>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StandardizationReport {
    /// Number of extracted candidates, matched or not.
    pub processed_count: usize,
    /// Candidates with at least one match, in source order.
    pub results: Vec<StandardizedTerm>,
}

impl StandardizationReport {
    pub fn message(&self) -> String {
        format!(
            "Processed {} candidate terms, found {} matches",
            self.processed_count,
            self.results.len()
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StandardizeOptions {
    pub resolve: ResolveOptions,
    /// Candidates resolved concurrently within one request.
    pub max_concurrency: usize,
    /// Deadline for the whole request. Unfinished candidates are dropped.
    pub timeout: Option<Duration>,
}

impl Default for StandardizeOptions {
    fn default() -> Self {
        Self {
            resolve: ResolveOptions::default(),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            timeout: None,
        }
    }
}

impl StandardizeOptions {
    pub fn with_resolve(mut self, resolve: ResolveOptions) -> Self {
        self.resolve = resolve;
        self
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl From<&Config> for StandardizeOptions {
    fn from(config: &Config) -> Self {
        Self {
            resolve: ResolveOptions::default().with_limit(config.search_limit),
            max_concurrency: config.max_concurrency,
            timeout: config.request_timeout,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Collection exists and is loaded for search.
    Loaded,
    /// Collection does not exist; every resolution is empty.
    Absent,
    Released,
}
