//! Test server harness.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use finstd::catalog::{CatalogBuilder, GlossaryRow};
use finstd::embedding::{Embedder, EmbeddingConfig, MockEmbedder, TermEmbedder};
use finstd::gateway::{HandlerState, create_router_with_state};
use finstd::standardize::{StandardizeOptions, Standardizer};
use finstd::vectordb::{CatalogStore, MockCatalogStore, QdrantCatalog, qualified_collection_name};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

const STARTUP_WAIT_TIMEOUT_SECS: u64 = 5;
const STARTUP_POLL_INTERVAL_MS: u64 = 50;
pub const TEST_DB_NAME: &str = "finstd_test";
pub const TEST_COLLECTION_NAME: &str = "finance_terms";
pub const TEST_EMBEDDING_DIM: usize = 32;

/// Glossary loaded into every test catalog unless overridden.
pub const DEFAULT_GLOSSARY: [(&str, &str); 6] = [
    ("investment", "INVESTMENT"),
    ("bond", "SECURITIES"),
    ("equity", "SECURITIES"),
    ("net income", "ACCOUNTING"),
    ("interest rate swap", "DERIVATIVES"),
    ("liquidity", "BANKING"),
];

#[derive(Debug, Clone)]
pub struct TestServerConfig {
    pub port: u16,
    pub glossary: Vec<(String, String)>,
    pub options: StandardizeOptions,
    /// Texts the serving embedder holds back before answering.
    pub embed_delays: Vec<(String, Duration)>,
}

impl Default for TestServerConfig {
    fn default() -> Self {
        Self {
            port: 0,
            glossary: DEFAULT_GLOSSARY
                .iter()
                .map(|(n, t)| (n.to_string(), t.to_string()))
                .collect(),
            options: StandardizeOptions::default(),
            embed_delays: Vec::new(),
        }
    }
}

impl TestServerConfig {
    pub fn with_options(mut self, options: StandardizeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_embed_delay(mut self, text: &str, delay: Duration) -> Self {
        self.embed_delays.push((text.to_string(), delay));
        self
    }

    fn rows(&self) -> Vec<GlossaryRow> {
        self.glossary
            .iter()
            .map(|(name, term_type)| GlossaryRow::new(name, term_type))
            .collect()
    }
}

pub struct TestServer {
    pub addr: SocketAddr,
    /// Present when the server runs against the in-memory store.
    pub mock_store: Option<Arc<MockCatalogStore>>,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl TestServer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

pub async fn find_available_port() -> std::io::Result<u16> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    Ok(addr.port())
}

pub async fn wait_for_server_ready(
    addr: SocketAddr,
    timeout: Duration,
    interval: Duration,
) -> Result<(), ServerStartupError> {
    let start = std::time::Instant::now();

    loop {
        if start.elapsed() > timeout {
            return Err(ServerStartupError::Timeout);
        }

        match tokio::net::TcpStream::connect(addr).await {
            Ok(_) => return Ok(()),
            Err(_) => {
                tokio::time::sleep(interval).await;
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServerStartupError {
    #[error("Server failed to start within timeout")]
    Timeout,
    #[error("Failed to bind to address: {0}")]
    BindError(#[from] std::io::Error),
    #[error("Server startup failed: {0}")]
    StartupFailed(String),
}

/// Spawns a server over an in-memory catalog and a deterministic embedder.
///
/// The catalog is built from `config.glossary` through [`CatalogBuilder`], so
/// the server sees exactly what the build job would have written.
pub async fn spawn_test_server(config: TestServerConfig) -> Result<TestServer, ServerStartupError> {
    let store = Arc::new(MockCatalogStore::new());

    build_catalog(
        Arc::new(MockEmbedder::new(TEST_EMBEDDING_DIM)),
        Arc::clone(&store),
        TEST_COLLECTION_NAME,
        &config,
    )
    .await?;

    let embedder = Arc::new(
        config
            .embed_delays
            .iter()
            .fold(MockEmbedder::new(TEST_EMBEDDING_DIM), |embedder, (text, delay)| {
                embedder.delay_on(text, *delay)
            }),
    );
    let mut server = serve(embedder, Arc::clone(&store), TEST_COLLECTION_NAME, &config).await?;
    server.mock_store = Some(store);
    Ok(server)
}

/// Spawns a server against a **real Qdrant** instance.
///
/// The embedder is still the deterministic stub; "real" refers to the vector
/// store only. Each call builds its own uniquely named collection.
///
/// Requires a running Qdrant (`FINSTD_QDRANT_URL`, default `http://localhost:6334`):
/// ```bash
/// docker run -p 6333:6333 -p 6334:6334 qdrant/qdrant
/// ```
pub async fn spawn_real_server(config: TestServerConfig) -> Result<TestServer, ServerStartupError> {
    let qdrant_url = std::env::var("FINSTD_QDRANT_URL")
        .unwrap_or_else(|_| "http://localhost:6334".to_string());
    let store = QdrantCatalog::new(&qdrant_url).map_err(|e| {
        ServerStartupError::StartupFailed(format!("Failed to connect to Qdrant: {}", e))
    })?;
    store
        .health_check()
        .await
        .map_err(|e| ServerStartupError::StartupFailed(e.to_string()))?;

    let embedder = TermEmbedder::load(EmbeddingConfig::stub().with_dimension(TEST_EMBEDDING_DIM))
        .await
        .map_err(|e| ServerStartupError::StartupFailed(e.to_string()))?;

    let collection_name = format!("terms_{}", uuid::Uuid::new_v4().simple());
    let embedder = Arc::new(embedder);
    let store = Arc::new(store);

    build_catalog(
        Arc::clone(&embedder),
        Arc::clone(&store),
        &collection_name,
        &config,
    )
    .await?;

    serve(embedder, store, &collection_name, &config).await
}

async fn build_catalog<E, S>(
    embedder: Arc<E>,
    store: Arc<S>,
    collection_name: &str,
    config: &TestServerConfig,
) -> Result<(), ServerStartupError>
where
    E: Embedder + 'static,
    S: CatalogStore + 'static,
{
    let report = CatalogBuilder::new(embedder, store)
        .build(
            &qualified_collection_name(TEST_DB_NAME, collection_name),
            config.rows(),
            "test_glossary.csv",
        )
        .await
        .map_err(|e| ServerStartupError::StartupFailed(e.to_string()))?;

    if report.failed_batches > 0 {
        return Err(ServerStartupError::StartupFailed(format!(
            "{} catalog batches failed",
            report.failed_batches
        )));
    }
    Ok(())
}

async fn serve<E, S>(
    embedder: Arc<E>,
    store: Arc<S>,
    collection_name: &str,
    config: &TestServerConfig,
) -> Result<TestServer, ServerStartupError>
where
    E: Embedder + 'static,
    S: CatalogStore + 'static,
{
    let port = if config.port == 0 {
        find_available_port().await?
    } else {
        config.port
    };

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = TcpListener::bind(addr).await?;
    let local_addr = listener.local_addr()?;

    let standardizer =
        Arc::new(Standardizer::new(embedder, store).with_options(config.options.clone()));
    let state = HandlerState::new(standardizer, TEST_DB_NAME, collection_name)
        .with_embedder_stub(true);
    let app = create_router_with_state(state);

    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let server_handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .unwrap();
    });

    wait_for_server_ready(
        local_addr,
        Duration::from_secs(STARTUP_WAIT_TIMEOUT_SECS),
        Duration::from_millis(STARTUP_POLL_INTERVAL_MS),
    )
    .await?;

    Ok(TestServer {
        addr: local_addr,
        mock_store: None,
        _server_handle: server_handle,
        shutdown_tx: Some(shutdown_tx),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_find_available_port() {
        let port = find_available_port()
            .await
            .expect("Should find available port");
        assert!(port > 0);
    }

    #[test]
    fn test_server_config_defaults() {
        let config = TestServerConfig::default();
        assert_eq!(config.port, 0);
        assert_eq!(config.rows().len(), DEFAULT_GLOSSARY.len());
        assert!(config.embed_delays.is_empty());
    }

    #[test]
    fn test_spawners_are_referenced() {
        std::mem::drop(spawn_test_server(TestServerConfig::default()));
        std::mem::drop(spawn_real_server(TestServerConfig::default()));
    }
}
