//! Rebuilds a catalog collection from a header-less `term_name,term_type` CSV.
//!
//! ```text
//! finstd-build-catalog <glossary.csv>
//! ```
//!
//! The target collection comes from `FINSTD_DB_NAME` / `FINSTD_COLLECTION`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use mimalloc::MiMalloc;

use finstd::catalog::CatalogBuilder;
use finstd::config::Config;
use finstd::embedding::{EmbeddingConfig, TermEmbedder};
use finstd::vectordb::{QdrantCatalog, qualified_collection_name};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let csv_path: PathBuf = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .context("usage: finstd-build-catalog <glossary.csv>")?;

    let config = Config::from_env()?;
    config.validate()?;
    let collection = qualified_collection_name(&config.db_name, &config.collection_name);

    let embedder = Arc::new(TermEmbedder::load(EmbeddingConfig::from_env()?).await?);
    let store = Arc::new(QdrantCatalog::new(&config.qdrant_url)?);
    store
        .health_check()
        .await
        .with_context(|| format!("vector store at {} is not reachable", config.qdrant_url))?;

    tracing::info!(
        path = %csv_path.display(),
        collection = %collection,
        embedder = ?embedder,
        "Building catalog"
    );

    let report = CatalogBuilder::new(embedder, store)
        .build_from_csv(&collection, &csv_path)
        .await?;

    if report.failed_batches > 0 {
        tracing::warn!(
            failed_batches = report.failed_batches,
            "Some batches were skipped; the catalog is incomplete"
        );
    }
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
