use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_EMBEDDING_DIM, DEFAULT_EMBEDDING_MODEL};
use crate::embedding::error::EmbeddingError;

/// Default HTTP timeout for embedding requests.
pub const DEFAULT_EMBEDDING_TIMEOUT_SECS: u64 = 30;

/// Embedding backends a catalog can be built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    /// HuggingFace model served by text-embeddings-inference (`POST /embed`).
    HuggingFace,
    /// OpenAI-compatible `POST /embeddings`.
    OpenAi,
    /// AWS Bedrock. Recognized, but no client is built in.
    Bedrock,
}

impl EmbeddingProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmbeddingProvider::HuggingFace => "huggingface",
            EmbeddingProvider::OpenAi => "openai",
            EmbeddingProvider::Bedrock => "bedrock",
        }
    }
}

impl fmt::Display for EmbeddingProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmbeddingProvider {
    type Err = EmbeddingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "huggingface" | "hf" => Ok(EmbeddingProvider::HuggingFace),
            "openai" => Ok(EmbeddingProvider::OpenAi),
            "bedrock" => Ok(EmbeddingProvider::Bedrock),
            _ => Err(EmbeddingError::UnsupportedProvider {
                provider: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone)]
/// Configuration for [`TermEmbedder`](super::TermEmbedder).
pub struct EmbeddingConfig {
    /// Provider that produced (or will produce) catalog vectors.
    pub provider: EmbeddingProvider,
    /// Model name, e.g. `BAAI/bge-m3`.
    pub model: String,
    /// Base URL of the embedding service. Required unless stubbed.
    pub endpoint: Option<String>,
    /// Bearer token sent as `Authorization`.
    pub api_key: Option<String>,
    /// Expected output dimension. Probed from the service when `None`.
    pub dimension: Option<usize>,
    /// HTTP timeout per request.
    pub timeout: Duration,
    /// If true, run in deterministic stub mode (no service required).
    pub testing_stub: bool,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::HuggingFace,
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
            endpoint: None,
            api_key: None,
            dimension: None,
            timeout: Duration::from_secs(DEFAULT_EMBEDDING_TIMEOUT_SECS),
            testing_stub: false,
        }
    }
}

impl EmbeddingConfig {
    pub const ENV_PROVIDER: &'static str = "FINSTD_EMBEDDING_PROVIDER";
    pub const ENV_MODEL: &'static str = "FINSTD_EMBEDDING_MODEL";
    pub const ENV_URL: &'static str = "FINSTD_EMBEDDING_URL";
    pub const ENV_API_KEY: &'static str = "FINSTD_EMBEDDING_API_KEY";
    pub const ENV_DIM: &'static str = "FINSTD_EMBEDDING_DIM";
    pub const ENV_TIMEOUT_SECS: &'static str = "FINSTD_EMBEDDING_TIMEOUT_SECS";

    /// Loads config from environment variables.
    ///
    /// Without `FINSTD_EMBEDDING_URL` the config falls back to stub mode.
    pub fn from_env() -> Result<Self, EmbeddingError> {
        let defaults = Self::default();

        let provider = match env_value(Self::ENV_PROVIDER) {
            Some(value) => value.parse()?,
            None => defaults.provider,
        };
        let model = env_value(Self::ENV_MODEL).unwrap_or(defaults.model);
        let endpoint = env_value(Self::ENV_URL);
        let api_key = env_value(Self::ENV_API_KEY);

        let dimension = env_value(Self::ENV_DIM)
            .map(|v| {
                v.parse::<usize>()
                    .map_err(|e| EmbeddingError::InvalidConfig {
                        reason: format!("{}='{}': {}", Self::ENV_DIM, v, e),
                    })
            })
            .transpose()?;

        let timeout = env_value(Self::ENV_TIMEOUT_SECS)
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);

        let testing_stub = endpoint.is_none();

        Ok(Self {
            provider,
            model,
            endpoint,
            api_key,
            dimension,
            timeout,
            testing_stub,
        })
    }

    /// Creates a config for an HTTP embedding service.
    pub fn http(provider: EmbeddingProvider, model: &str, endpoint: &str) -> Self {
        Self {
            provider,
            model: model.to_string(),
            endpoint: Some(endpoint.trim_end_matches('/').to_string()),
            ..Default::default()
        }
    }

    /// Creates a stub config (no service; deterministic embeddings of the default dimension).
    pub fn stub() -> Self {
        Self {
            dimension: Some(DEFAULT_EMBEDDING_DIM),
            testing_stub: true,
            ..Default::default()
        }
    }

    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = Some(dimension);
        self
    }

    pub fn with_api_key(mut self, key: &str) -> Self {
        self.api_key = Some(key.to_string());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Validates required fields for the selected mode.
    pub fn validate(&self) -> Result<(), EmbeddingError> {
        if self.model.trim().is_empty() {
            return Err(EmbeddingError::InvalidConfig {
                reason: "model name is required".to_string(),
            });
        }

        if self.dimension == Some(0) {
            return Err(EmbeddingError::InvalidConfig {
                reason: "embedding dimension cannot be zero".to_string(),
            });
        }

        if self.testing_stub {
            return Ok(());
        }

        if self.provider == EmbeddingProvider::Bedrock {
            return Err(EmbeddingError::UnsupportedProvider {
                provider: format!("{} (no Bedrock client in this build)", self.provider),
            });
        }

        match self.endpoint.as_deref() {
            None | Some("") => Err(EmbeddingError::InvalidConfig {
                reason: "endpoint is required (stubbing is disabled)".to_string(),
            }),
            Some(url) if !url.starts_with("http://") && !url.starts_with("https://") => {
                Err(EmbeddingError::InvalidConfig {
                    reason: format!("endpoint '{}' is not an http(s) URL", url),
                })
            }
            Some(_) => Ok(()),
        }
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
