use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info, instrument, warn};

use crate::constants::{
    DEFAULT_TERM_CATEGORY, DIMENSION_PROBE_TEXT, INGEST_BATCH_SIZE, validate_embedding_dim,
};
use crate::embedding::{Embedder, EmbeddingError};
use crate::vectordb::{
    CatalogStore, CollectionSchema, IndexParams, TermAttributes, TermRecord,
};

use super::error::{IngestError, IngestResult};
use super::glossary::{GlossaryRow, read_glossary};

/// Outcome of one catalog build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    /// Rows read from the glossary.
    pub rows: usize,
    pub inserted: usize,
    pub failed_batches: usize,
}

/// Rebuilds a catalog collection from a glossary.
///
/// The target collection is dropped and recreated on every run.
pub struct CatalogBuilder<E: Embedder, S: CatalogStore> {
    embedder: Arc<E>,
    store: Arc<S>,
    batch_size: usize,
}

impl<E: Embedder, S: CatalogStore> CatalogBuilder<E, S> {
    pub fn new(embedder: Arc<E>, store: Arc<S>) -> Self {
        Self {
            embedder,
            store,
            batch_size: INGEST_BATCH_SIZE,
        }
    }

    /// Rows per embed/insert round. Zero is treated as one.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Reads `csv_path` and loads it into `collection`.
    pub async fn build_from_csv(
        &self,
        collection: &str,
        csv_path: &Path,
    ) -> IngestResult<IngestReport> {
        let rows = read_glossary(csv_path)?;
        info!(path = %csv_path.display(), rows = rows.len(), "Glossary read");
        self.build(collection, rows, &csv_path.display().to_string())
            .await
    }

    /// Loads `rows` into `collection`, recording `input_file` on every record.
    #[instrument(skip(self, rows), fields(rows = rows.len()))]
    pub async fn build(
        &self,
        collection: &str,
        rows: Vec<GlossaryRow>,
        input_file: &str,
    ) -> IngestResult<IngestReport> {
        let pending = prepare_records(rows, input_file);
        let mut schema = CollectionSchema::finance_terms(0);
        for (row, record) in pending.iter().enumerate() {
            schema
                .validate_fields(record)
                .map_err(|source| IngestError::InvalidRow { row: row + 1, source })?;
        }

        let dimension = self.probe_dimension().await?;
        schema.dimension = dimension;

        if self.store.has_collection(collection).await? {
            warn!(collection, "Dropping existing collection");
            self.store.drop_collection(collection).await?;
        }
        self.store.create_collection(collection, &schema).await?;
        self.store
            .create_index(collection, &IndexParams::vector_cosine())
            .await?;
        info!(collection, dimension, "Collection created");

        let mut report = IngestReport {
            rows: pending.len(),
            ..Default::default()
        };

        let total_batches = pending.len().div_ceil(self.batch_size);
        let mut pending = pending.into_iter().peekable();
        let mut batch_no = 0;

        while pending.peek().is_some() {
            batch_no += 1;
            let batch: Vec<TermRecord> = pending.by_ref().take(self.batch_size).collect();
            let first_row = (batch_no - 1) * self.batch_size + 1;

            let vectors = match self.embed_batch(&batch).await {
                Ok(vectors) => vectors,
                Err(e) => {
                    error!(batch = batch_no, first_row, error = %e, "Embedding batch failed, skipping");
                    report.failed_batches += 1;
                    continue;
                }
            };

            let records = batch
                .into_iter()
                .zip(vectors)
                .map(|(mut record, vector)| {
                    record.vector = vector;
                    record
                })
                .collect();

            match self.store.insert(collection, records).await {
                Ok(summary) => {
                    report.inserted += summary.inserted;
                    info!(
                        batch = batch_no,
                        total_batches,
                        inserted = report.inserted,
                        "Batch inserted"
                    );
                }
                Err(e) => {
                    error!(batch = batch_no, first_row, error = %e, "Insert batch failed, skipping");
                    report.failed_batches += 1;
                }
            }
        }

        info!(
            collection,
            rows = report.rows,
            inserted = report.inserted,
            failed_batches = report.failed_batches,
            "Catalog build finished"
        );
        Ok(report)
    }

    async fn probe_dimension(&self) -> IngestResult<usize> {
        let declared = self.embedder.dimension();
        let actual = self
            .embedder
            .embed(&[DIMENSION_PROBE_TEXT])
            .await?
            .first()
            .map(Vec::len)
            .unwrap_or(0);

        validate_embedding_dim(actual, declared)
            .map_err(|e| IngestError::from_probe(declared, e))?;
        Ok(actual)
    }

    async fn embed_batch(&self, batch: &[TermRecord]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let names: Vec<&str> = batch
            .iter()
            .map(|r| r.attributes.term_name.as_str())
            .collect();
        let vectors = self.embedder.embed(&names).await?;

        if vectors.len() != names.len() {
            return Err(EmbeddingError::InvalidResponse {
                reason: format!("expected {} embeddings, got {}", names.len(), vectors.len()),
            });
        }
        Ok(vectors)
    }
}

/// Records without vectors. `term_id` counts from 1 in file order.
fn prepare_records(rows: Vec<GlossaryRow>, input_file: &str) -> Vec<TermRecord> {
    rows.into_iter()
        .enumerate()
        .map(|(idx, row)| {
            let attributes = TermAttributes::new(
                &(idx + 1).to_string(),
                &row.term_name,
                DEFAULT_TERM_CATEGORY,
                &row.term_type,
            )
            .with_definition("")
            .with_synonyms("");
            TermRecord::new(attributes, Vec::new()).with_input_file(input_file)
        })
        .collect()
}
