//! HTTP client helpers for tests.

use std::time::Duration;

use finstd::gateway::FINSTD_STATUS_HEADER;
use finstd::gateway::payload::StandardizeResponse;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(DEFAULT_TIMEOUT_SECS);

pub struct TestClient {
    client: reqwest::Client,
    base_url: String,
}

impl TestClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        format!("{}/{}", self.base_url, path)
    }

    /// Posts `body` to `/api/fin-std`; returns the response and its status header.
    pub async fn standardize(
        &self,
        body: &Value,
    ) -> Result<(StandardizeResponse, String), TestClientError> {
        let resp = self
            .client
            .post(self.url("/api/fin-std"))
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;

        let status_header = resp
            .headers()
            .get(FINSTD_STATUS_HEADER)
            .and_then(|h| h.to_str().ok())
            .unwrap_or("unknown")
            .to_string();

        match resp.status().as_u16() {
            200 => Ok((resp.json().await?, status_header)),
            400 | 422 => Err(TestClientError::BadRequest(resp.text().await?)),
            status => {
                let body = resp.text().await.unwrap_or_default();
                Err(TestClientError::UnexpectedStatus(status, body))
            }
        }
    }

    /// Standardizes plain text with default options.
    pub async fn standardize_text(
        &self,
        text: &str,
    ) -> Result<StandardizeResponse, TestClientError> {
        let (response, _) = self.standardize(&serde_json::json!({ "text": text })).await?;
        Ok(response)
    }

    pub async fn health(&self) -> Result<HealthResponse, TestClientError> {
        self.get_json("/health").await
    }

    pub async fn ready(&self) -> Result<ReadyResponse, TestClientError> {
        self.get_json("/ready").await
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
    ) -> Result<T, TestClientError> {
        let resp = self.client.get(self.url(path)).send().await?;

        if resp.status().is_success() {
            Ok(resp.json().await?)
        } else {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            Err(TestClientError::UnexpectedStatus(status, body))
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ComponentStatus {
    pub http: String,
    pub vectordb: String,
    pub embedder_mode: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReadyResponse {
    pub status: String,
    pub components: ComponentStatus,
}

impl ReadyResponse {
    pub fn is_ok(&self) -> bool {
        self.status == "ready"
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TestClientError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Unexpected HTTP status: {0} - Body: {1}")]
    UnexpectedStatus(u16, String),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_url_building() {
        let client = TestClient::new("http://localhost:8001");
        assert_eq!(client.url("/health"), "http://localhost:8001/health");
        assert_eq!(client.url("health"), "http://localhost:8001/health");
    }

    #[test]
    fn test_client_exposes_endpoints() {
        let client = TestClient::new("http://localhost:8001");
        std::mem::drop(client.health());
        std::mem::drop(client.ready());
        std::mem::drop(client.standardize_text("bond"));
    }

    #[test]
    fn test_ready_response_is_ok_helper() {
        let ready = ReadyResponse {
            status: "ready".to_string(),
            components: ComponentStatus {
                http: "ready".to_string(),
                vectordb: "ready".to_string(),
                embedder_mode: "stub".to_string(),
            },
        };
        assert!(ready.is_ok());
    }
}
