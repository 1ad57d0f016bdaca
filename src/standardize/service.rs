use std::sync::Arc;

use tracing::instrument;

use crate::embedding::Embedder;
use crate::extract::CandidateExtractor;
use crate::resolve::TermResolver;
use crate::vectordb::{CatalogStore, TermAttributes, TermFilter};

use super::error::StandardizeResult;
use super::session::{CatalogSession, CollectionLeases};
use super::types::{CatalogHandle, StandardizationReport, StandardizeOptions};

/// Entry point for standardizing whole texts.
///
/// Each call opens its own [`CatalogSession`] and releases it before returning.
/// Sessions opened from one standardizer share [`CollectionLeases`], so a
/// collection stays loaded while any of them still uses it.
pub struct Standardizer<E: Embedder + 'static, S: CatalogStore + 'static> {
    resolver: TermResolver<E, S>,
    extractor: CandidateExtractor,
    leases: CollectionLeases,
    options: StandardizeOptions,
}

impl<E: Embedder + 'static, S: CatalogStore + 'static> std::fmt::Debug for Standardizer<E, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Standardizer")
            .field("resolver", &self.resolver)
            .field("options", &self.options)
            .finish()
    }
}

impl<E: Embedder + 'static, S: CatalogStore + 'static> Standardizer<E, S> {
    pub fn new(embedder: Arc<E>, store: Arc<S>) -> Self {
        Self {
            resolver: TermResolver::new(embedder, store),
            extractor: CandidateExtractor::default(),
            leases: CollectionLeases::new(),
            options: StandardizeOptions::default(),
        }
    }

    pub fn with_options(mut self, options: StandardizeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &StandardizeOptions {
        &self.options
    }

    pub fn embedder(&self) -> &Arc<E> {
        self.resolver.embedder()
    }

    pub fn store(&self) -> &Arc<S> {
        self.resolver.store()
    }

    pub fn leases(&self) -> &CollectionLeases {
        &self.leases
    }

    /// Opens a session the caller must [`release`](CatalogSession::release).
    pub async fn open_session(&self, handle: CatalogHandle) -> StandardizeResult<CatalogSession<E, S>> {
        CatalogSession::open(
            self.resolver.clone(),
            self.extractor,
            self.leases.clone(),
            handle,
        )
        .await
    }

    #[instrument(skip(self, text), fields(text_len = text.len(), collection = %handle.qualified_name()))]
    pub async fn standardize(
        &self,
        text: &str,
        handle: CatalogHandle,
    ) -> StandardizeResult<StandardizationReport> {
        let session = self.open_session(handle).await?;
        let report = session.standardize(text, &self.options).await;
        session.release().await;
        Ok(report)
    }

    /// Attribute-only lookup through a short-lived session.
    pub async fn query_terms(
        &self,
        handle: CatalogHandle,
        filter: &TermFilter,
        limit: usize,
    ) -> StandardizeResult<Vec<TermAttributes>> {
        let session = self.open_session(handle).await?;
        let terms = session.query_terms(filter, limit).await;
        session.release().await;
        terms
    }
}
