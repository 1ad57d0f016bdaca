use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::embedding::EmbeddingProvider;
use crate::standardize::{CatalogHandle, StandardizationReport, StandardizedTerm};

const DEFAULT_TERM_CATEGORIES: [&str; 11] = [
    "investment",
    "banking",
    "insurance",
    "securities",
    "accounting",
    "economics",
    "derivatives",
    "real_estate",
    "fintech",
    "regulation",
    "all_finance_terms",
];

fn default_term_categories() -> BTreeMap<String, bool> {
    DEFAULT_TERM_CATEGORIES
        .iter()
        .map(|c| (c.to_string(), true))
        .collect()
}

fn default_llm_options() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("provider".to_string(), "ollama".to_string()),
        ("model".to_string(), "qwen2.5:7b".to_string()),
    ])
}

/// Body of `POST /api/fin-std`.
///
/// `termCategories` and `llmOptions` are accepted for compatibility but not applied.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandardizeRequest {
    pub text: String,

    #[serde(default = "default_term_categories")]
    pub term_categories: BTreeMap<String, bool>,

    #[serde(default)]
    pub embedding_options: EmbeddingOptions,

    #[serde(default = "default_llm_options")]
    pub llm_options: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddingOptions {
    pub provider: Option<EmbeddingProvider>,
    pub model: Option<String>,
    pub db_name: Option<String>,
    pub collection_name: Option<String>,
}

impl EmbeddingOptions {
    /// Resolves to a handle, taking missing fields from `defaults`.
    pub fn into_handle(self, defaults: &CatalogHandle) -> CatalogHandle {
        CatalogHandle {
            provider: self.provider.unwrap_or(defaults.provider),
            model: self.model.unwrap_or_else(|| defaults.model.clone()),
            db_name: self.db_name.unwrap_or_else(|| defaults.db_name.clone()),
            collection_name: self
                .collection_name
                .unwrap_or_else(|| defaults.collection_name.clone()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardizeResponse {
    pub message: String,
    pub processed_count: usize,
    pub standardized_terms: Vec<StandardizedTerm>,
}

impl From<StandardizationReport> for StandardizeResponse {
    fn from(report: StandardizationReport) -> Self {
        Self {
            message: report.message(),
            processed_count: report.processed_count,
            standardized_terms: report.results,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub message: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub components: ComponentStatus,
}

#[derive(Debug, Serialize)]
pub struct ComponentStatus {
    pub http: &'static str,
    pub vectordb: &'static str,
    pub embedder_mode: &'static str,
}
