//! HTTP embedding client (text-embeddings-inference or OpenAI-compatible).

use serde_json::{Value, json};
use tracing::{debug, info};

use super::Embedder;
use super::config::{EmbeddingConfig, EmbeddingProvider};
use super::error::EmbeddingError;
use super::stub::l2_normalize;
use crate::constants::DIMENSION_PROBE_TEXT;

/// Embedder backed by a remote embedding service.
///
/// The output dimension is taken from the config when set, and otherwise
/// discovered by embedding a probe text during [`HttpEmbedder::connect`].
#[derive(Debug, Clone)]
pub struct HttpEmbedder {
    client: reqwest::Client,
    url: String,
    config: EmbeddingConfig,
    dimension: usize,
}

impl HttpEmbedder {
    /// Builds the client and verifies the service answers with the expected dimension.
    pub async fn connect(config: EmbeddingConfig) -> Result<Self, EmbeddingError> {
        config.validate()?;

        let endpoint = config
            .endpoint
            .as_deref()
            .ok_or_else(|| EmbeddingError::InvalidConfig {
                reason: "endpoint is required".to_string(),
            })?;
        let url = request_url(config.provider, endpoint);

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| EmbeddingError::InvalidConfig {
                reason: format!("failed to build HTTP client: {}", e),
            })?;

        let mut embedder = Self {
            client,
            url,
            dimension: config.dimension.unwrap_or(0),
            config,
        };

        let probe = embedder.request(&[DIMENSION_PROBE_TEXT]).await?;
        let actual = probe
            .first()
            .map(Vec::len)
            .filter(|len| *len > 0)
            .ok_or_else(|| EmbeddingError::InvalidResponse {
                reason: "probe returned no embedding".to_string(),
            })?;

        if let Some(expected) = embedder.config.dimension
            && expected != actual
        {
            return Err(EmbeddingError::DimensionMismatch { expected, actual });
        }
        embedder.dimension = actual;

        info!(
            provider = %embedder.config.provider,
            model = %embedder.config.model,
            url = %embedder.url,
            dimension = actual,
            "Embedding service connected"
        );

        Ok(embedder)
    }

    /// Returns the resolved request URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    async fn request(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let payload = build_payload(self.config.provider, texts, &self.config.model);

        let mut builder = self.client.post(&self.url).json(&payload);
        if let Some(key) = self.config.api_key.as_deref() {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| EmbeddingError::RequestFailed {
                url: self.url.clone(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::RequestFailed {
                url: self.url.clone(),
                reason: format!("HTTP {}: {}", status.as_u16(), body),
            });
        }

        let value: Value = response
            .json()
            .await
            .map_err(|e| EmbeddingError::InvalidResponse {
                reason: e.to_string(),
            })?;

        let mut vectors = parse_embeddings(value)?;
        if vectors.len() != texts.len() {
            return Err(EmbeddingError::InvalidResponse {
                reason: format!(
                    "service returned {} embeddings for {} inputs",
                    vectors.len(),
                    texts.len()
                ),
            });
        }

        for vector in &mut vectors {
            l2_normalize(vector);
        }

        debug!(count = vectors.len(), "Embeddings received");
        Ok(vectors)
    }
}

impl Embedder for HttpEmbedder {
    fn provider(&self) -> EmbeddingProvider {
        self.config.provider
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let vectors = self.request(texts).await?;
        if let Some(bad) = vectors.iter().find(|v| v.len() != self.dimension) {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dimension,
                actual: bad.len(),
            });
        }
        Ok(vectors)
    }
}

pub(crate) fn request_url(provider: EmbeddingProvider, endpoint: &str) -> String {
    let base = endpoint.trim_end_matches('/');
    match provider {
        EmbeddingProvider::OpenAi => format!("{}/embeddings", base),
        EmbeddingProvider::HuggingFace | EmbeddingProvider::Bedrock => format!("{}/embed", base),
    }
}

pub(crate) fn build_payload(provider: EmbeddingProvider, texts: &[&str], model: &str) -> Value {
    match provider {
        EmbeddingProvider::OpenAi => json!({ "input": texts, "model": model }),
        EmbeddingProvider::HuggingFace | EmbeddingProvider::Bedrock => {
            json!({ "inputs": texts, "truncate": true })
        }
    }
}

/// Accepts `[[f32]]`, `{"embeddings": [[f32]]}` and OpenAI's `{"data": [{"embedding": [f32]}]}`.
pub(crate) fn parse_embeddings(value: Value) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    match value {
        Value::Object(mut map) => {
            if let Some(embeddings) = map.remove("embeddings") {
                return parse_embedding_collection(embeddings);
            }

            if let Some(Value::Array(items)) = map.remove("data") {
                let mut vectors = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Value::Object(mut obj) => match obj.remove("embedding") {
                            Some(embedding) => vectors.push(parse_embedding_vector(embedding)?),
                            None => {
                                return Err(EmbeddingError::InvalidResponse {
                                    reason: "missing `embedding` field in data item".to_string(),
                                });
                            }
                        },
                        _ => {
                            return Err(EmbeddingError::InvalidResponse {
                                reason: "unexpected entry inside `data` array".to_string(),
                            });
                        }
                    }
                }
                return Ok(vectors);
            }

            Err(EmbeddingError::InvalidResponse {
                reason: "unsupported response shape".to_string(),
            })
        }
        other => parse_embedding_collection(other),
    }
}

fn parse_embedding_collection(value: Value) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    match value {
        Value::Array(items) if items.iter().all(|item| matches!(item, Value::Array(_))) => {
            items.into_iter().map(parse_embedding_vector).collect()
        }
        other => Err(EmbeddingError::InvalidResponse {
            reason: format!("expected an array of vectors, got {}", other),
        }),
    }
}

fn parse_embedding_vector(value: Value) -> Result<Vec<f32>, EmbeddingError> {
    match value {
        Value::Array(values) => values
            .into_iter()
            .map(|entry| match entry {
                Value::Number(num) => {
                    num.as_f64()
                        .map(|f| f as f32)
                        .ok_or_else(|| EmbeddingError::InvalidResponse {
                            reason: "non-finite embedding value".to_string(),
                        })
                }
                other => Err(EmbeddingError::InvalidResponse {
                    reason: format!("embedding entries must be numbers, got {}", other),
                }),
            })
            .collect(),
        other => Err(EmbeddingError::InvalidResponse {
            reason: format!("embedding vector must be an array, got {}", other),
        }),
    }
}
