use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::embedding::Embedder;
use crate::vectordb::CatalogStore;

use super::error::ResolveResult;
use super::types::{ResolveOptions, TermMatch};

/// Resolves one candidate term to its nearest catalog entries.
pub struct TermResolver<E: Embedder, S: CatalogStore> {
    embedder: Arc<E>,
    store: Arc<S>,
}

impl<E: Embedder, S: CatalogStore> Clone for TermResolver<E, S> {
    fn clone(&self) -> Self {
        Self {
            embedder: Arc::clone(&self.embedder),
            store: Arc::clone(&self.store),
        }
    }
}

impl<E: Embedder, S: CatalogStore> std::fmt::Debug for TermResolver<E, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TermResolver")
            .field("provider", &self.embedder.provider())
            .field("model", &self.embedder.model())
            .field("dimension", &self.embedder.dimension())
            .finish_non_exhaustive()
    }
}

impl<E: Embedder, S: CatalogStore> TermResolver<E, S> {
    pub fn new(embedder: Arc<E>, store: Arc<S>) -> Self {
        Self { embedder, store }
    }

    pub fn embedder(&self) -> &Arc<E> {
        &self.embedder
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Resolves `candidate` against `collection`.
    ///
    /// An absent collection yields no matches rather than an error. The
    /// collection must otherwise be loaded.
    #[instrument(skip(self, candidate, options), fields(collection = collection, candidate_len = candidate.len()))]
    pub async fn resolve(
        &self,
        collection: &str,
        candidate: &str,
        options: &ResolveOptions,
    ) -> ResolveResult<Vec<TermMatch>> {
        if !self.store.has_collection(collection).await? {
            warn!("Collection does not exist, returning no matches");
            return Ok(Vec::new());
        }

        self.resolve_loaded(collection, candidate, options).await
    }

    /// Same as [`resolve`](Self::resolve) but assumes `collection` exists and is loaded.
    pub async fn resolve_loaded(
        &self,
        collection: &str,
        candidate: &str,
        options: &ResolveOptions,
    ) -> ResolveResult<Vec<TermMatch>> {
        if candidate.trim().is_empty() || options.limit == 0 {
            return Ok(Vec::new());
        }

        let vector = self.embedder.embed_query(candidate).await?;

        let hits = self
            .store
            .search(collection, &vector, options.limit, options.filter.as_ref())
            .await?;
        let total = hits.len();

        let mut matches: Vec<TermMatch> = hits
            .into_iter()
            .filter(|hit| options.max_distance.is_none_or(|max| hit.distance <= max))
            .map(TermMatch::from)
            .collect();
        matches.sort_by(|a, b| a.distance.total_cmp(&b.distance));

        debug!(
            collection = collection,
            hits = total,
            kept = matches.len(),
            best_distance = matches.first().map(|m| m.distance),
            "Candidate resolved"
        );

        Ok(matches)
    }
}
