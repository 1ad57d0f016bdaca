use std::collections::{HashMap, HashSet};
use std::time::Duration;

use parking_lot::Mutex;

use super::{Embedder, EmbeddingError, EmbeddingProvider, StubEmbedder};

/// Scriptable embedder for tests.
///
/// Falls back to [`StubEmbedder`] vectors, and can pin vectors, inject
/// failures or delay specific texts. Every embedded text is recorded.
#[derive(Debug, Default)]
pub struct MockEmbedder {
    inner: StubEmbedder,
    vectors: HashMap<String, Vec<f32>>,
    failing: HashSet<String>,
    delays: HashMap<String, Duration>,
    calls: Mutex<Vec<String>>,
}

impl MockEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            inner: StubEmbedder::new(dimension),
            ..Default::default()
        }
    }

    pub fn with_identity(provider: EmbeddingProvider, model: &str, dimension: usize) -> Self {
        Self {
            inner: StubEmbedder::with_identity(provider, model, dimension),
            ..Default::default()
        }
    }

    /// Returns `vector` for `text` instead of the stub embedding.
    pub fn with_vector(mut self, text: &str, vector: Vec<f32>) -> Self {
        self.vectors.insert(text.to_string(), vector);
        self
    }

    /// Fails any batch containing `text`.
    pub fn fail_on(mut self, text: &str) -> Self {
        self.failing.insert(text.to_string());
        self
    }

    /// Sleeps before answering any batch containing `text`.
    pub fn delay_on(mut self, text: &str, delay: Duration) -> Self {
        self.delays.insert(text.to_string(), delay);
        self
    }

    /// Texts embedded so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

impl Embedder for MockEmbedder {
    fn provider(&self) -> EmbeddingProvider {
        self.inner.provider()
    }

    fn model(&self) -> &str {
        self.inner.model()
    }

    fn dimension(&self) -> usize {
        self.inner.dimension()
    }

    async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        self.calls
            .lock()
            .extend(texts.iter().map(|t| t.to_string()));

        let delay = texts
            .iter()
            .filter_map(|t| self.delays.get(*t).copied())
            .max();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(text) = texts.iter().find(|t| self.failing.contains(**t)) {
            return Err(EmbeddingError::RequestFailed {
                url: "mock://embedder".to_string(),
                reason: format!("injected failure for '{}'", text),
            });
        }

        Ok(texts
            .iter()
            .map(|t| {
                self.vectors
                    .get(*t)
                    .cloned()
                    .unwrap_or_else(|| self.inner.embed_one(t))
            })
            .collect())
    }
}
