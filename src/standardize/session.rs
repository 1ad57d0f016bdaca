use std::collections::HashMap;
use std::pin::pin;
use std::sync::Arc;

use futures_util::{StreamExt, stream};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, error, info, instrument, warn};

use crate::embedding::Embedder;
use crate::extract::CandidateExtractor;
use crate::resolve::TermResolver;
use crate::vectordb::{CatalogStore, TermAttributes, TermFilter, VectorDbError};

use super::error::{StandardizeError, StandardizeResult};
use super::types::{
    CatalogHandle, SessionState, StandardizationReport, StandardizeOptions, StandardizedTerm,
};

/// Counts open sessions per physical collection.
///
/// The store loads a collection when its first lease is taken and releases it
/// when the last one is returned. The lock is held across those store calls, so
/// load and release never interleave for the same collection.
#[derive(Debug, Clone, Default)]
pub struct CollectionLeases {
    counts: Arc<Mutex<HashMap<String, usize>>>,
}

impl CollectionLeases {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes a lease on `collection`, loading it if no lease was held.
    pub async fn acquire<S: CatalogStore>(
        &self,
        store: &S,
        collection: &str,
    ) -> Result<(), VectorDbError> {
        let mut counts = self.counts.lock().await;
        let held = counts.get(collection).copied().unwrap_or(0);
        if held == 0 {
            store.load_collection(collection).await?;
        }
        counts.insert(collection.to_string(), held + 1);
        Ok(())
    }

    /// Returns a lease. Releases the collection when it was the last one and
    /// reports whether the store was asked to do so.
    pub async fn release<S: CatalogStore>(
        &self,
        store: &S,
        collection: &str,
    ) -> Result<bool, VectorDbError> {
        let mut counts = self.counts.lock().await;
        let Some(held) = counts.get_mut(collection) else {
            return Ok(false);
        };
        *held = held.saturating_sub(1);
        if *held > 0 {
            debug!(collection, remaining = *held, "Lease returned, collection stays loaded");
            return Ok(false);
        }
        counts.remove(collection);
        store.release_collection(collection).await?;
        Ok(true)
    }

    /// Leases currently held on `collection`.
    pub async fn held(&self, collection: &str) -> usize {
        self.counts.lock().await.get(collection).copied().unwrap_or(0)
    }
}

/// A catalog collection bound to one request.
///
/// [`open`](Self::open) validates the handle and takes a lease on the
/// collection; [`release`](Self::release) consumes the session and returns the
/// lease. A session dropped while still loaded returns its lease on a
/// background task.
pub struct CatalogSession<E: Embedder + 'static, S: CatalogStore + 'static> {
    resolver: TermResolver<E, S>,
    extractor: CandidateExtractor,
    leases: CollectionLeases,
    handle: CatalogHandle,
    collection: String,
    state: SessionState,
}

impl<E: Embedder + 'static, S: CatalogStore + 'static> std::fmt::Debug for CatalogSession<E, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogSession")
            .field("collection", &self.collection)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<E: Embedder + 'static, S: CatalogStore + 'static> CatalogSession<E, S> {
    #[instrument(skip(resolver, extractor, leases), fields(collection = %handle.qualified_name()))]
    pub async fn open(
        resolver: TermResolver<E, S>,
        extractor: CandidateExtractor,
        leases: CollectionLeases,
        handle: CatalogHandle,
    ) -> StandardizeResult<Self> {
        let embedder = resolver.embedder();
        if embedder.provider() != handle.provider || embedder.model() != handle.model {
            return Err(StandardizeError::IncompatibleHandle {
                handle_provider: handle.provider,
                handle_model: handle.model,
                embedder_provider: embedder.provider(),
                embedder_model: embedder.model().to_string(),
            });
        }

        let collection = handle.qualified_name();
        let state = match resolver.store().collection_dimension(&collection).await? {
            None => {
                warn!(collection = %collection, "Collection does not exist, all candidates will resolve empty");
                SessionState::Absent
            }
            Some(stored) => {
                let dimension = embedder.dimension();
                if stored != dimension {
                    return Err(StandardizeError::DimensionMismatch {
                        collection,
                        stored,
                        embedder: dimension,
                    });
                }

                leases.acquire(resolver.store().as_ref(), &collection).await?;
                debug!(collection = %collection, dimension, "Session opened");
                SessionState::Loaded
            }
        };

        Ok(Self {
            resolver,
            extractor,
            leases,
            handle,
            collection,
            state,
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn handle(&self) -> &CatalogHandle {
        &self.handle
    }

    /// Physical collection name.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Extracts candidates from `text` and resolves each one.
    ///
    /// Candidates are resolved concurrently up to `max_concurrency` and
    /// reported in source order. Failed candidates are logged and omitted. If
    /// the deadline elapses, candidates still in flight are omitted.
    #[instrument(skip(self, text, options), fields(collection = %self.collection, text_len = text.len()))]
    pub async fn standardize(
        &self,
        text: &str,
        options: &StandardizeOptions,
    ) -> StandardizationReport {
        let candidates = self.extractor.extract(text);
        let processed_count = candidates.len();

        if self.state != SessionState::Loaded {
            return StandardizationReport {
                processed_count,
                results: Vec::new(),
            };
        }

        let deadline = options.timeout.map(|t| Instant::now() + t);
        let resolver = &self.resolver;
        let collection = self.collection.as_str();
        let resolve_options = &options.resolve;

        let mut resolutions = pin!(
            stream::iter(candidates.into_iter().enumerate())
                .map(move |(index, candidate)| async move {
                    let outcome = resolver
                        .resolve_loaded(collection, &candidate, resolve_options)
                        .await;
                    (index, candidate, outcome)
                })
                .buffer_unordered(options.max_concurrency.max(1))
        );

        let mut resolved = Vec::with_capacity(processed_count);
        let mut failed = 0usize;
        loop {
            let next = match deadline {
                Some(deadline) => match tokio::time::timeout_at(deadline, resolutions.next()).await {
                    Ok(next) => next,
                    Err(_) => {
                        warn!(
                            completed = resolved.len() + failed,
                            total = processed_count,
                            "Request deadline elapsed, returning partial results"
                        );
                        break;
                    }
                },
                None => resolutions.next().await,
            };

            let Some((index, candidate, outcome)) = next else {
                break;
            };

            match outcome {
                Ok(matches) if !matches.is_empty() => resolved.push((
                    index,
                    StandardizedTerm {
                        original_term: candidate,
                        standardized_results: matches,
                    },
                )),
                Ok(_) => {}
                Err(e) => {
                    failed += 1;
                    error!(candidate = %candidate, error = %e, "Candidate resolution failed, skipping");
                }
            }
        }

        resolved.sort_by_key(|(index, _)| *index);
        let results: Vec<StandardizedTerm> = resolved.into_iter().map(|(_, term)| term).collect();

        info!(
            processed = processed_count,
            matched = results.len(),
            failed,
            "Standardization complete"
        );

        StandardizationReport {
            processed_count,
            results,
        }
    }

    /// Attribute-only lookup in the bound collection.
    pub async fn query_terms(
        &self,
        filter: &TermFilter,
        limit: usize,
    ) -> StandardizeResult<Vec<TermAttributes>> {
        if self.state != SessionState::Loaded {
            return Ok(Vec::new());
        }

        Ok(self
            .resolver
            .store()
            .query(&self.collection, filter, limit)
            .await?)
    }

    /// Returns the lease, releasing the collection if no other session holds
    /// it. Failures are logged, never returned.
    #[instrument(skip(self), fields(collection = %self.collection))]
    pub async fn release(mut self) {
        let state = std::mem::replace(&mut self.state, SessionState::Released);
        if state == SessionState::Loaded
            && let Err(e) = self
                .leases
                .release(self.resolver.store().as_ref(), &self.collection)
                .await
        {
            error!(collection = %self.collection, error = %e, "Failed to release collection");
        }
    }
}

impl<E: Embedder + 'static, S: CatalogStore + 'static> Drop for CatalogSession<E, S> {
    fn drop(&mut self) {
        if self.state != SessionState::Loaded {
            return;
        }
        self.state = SessionState::Released;

        let store = Arc::clone(self.resolver.store());
        let leases = self.leases.clone();
        let collection = std::mem::take(&mut self.collection);
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                warn!(collection = %collection, "Session dropped without release, releasing in background");
                runtime.spawn(async move {
                    if let Err(e) = leases.release(store.as_ref(), &collection).await {
                        error!(collection = %collection, error = %e, "Background release failed");
                    }
                });
            }
            Err(_) => {
                warn!(collection = %collection, "Session dropped outside a runtime, collection left loaded");
            }
        }
    }
}
