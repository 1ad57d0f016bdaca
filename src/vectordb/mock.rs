use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::vectordb::{
    CatalogStore, CollectionSchema, IndexParams, InsertSummary, TermAttributes, TermFilter,
    TermHit, TermRecord, VectorDbError,
};

/// In-memory linear-scan [`CatalogStore`].
///
/// Follows the load discipline of a disk-backed store: a collection must be
/// indexed before it can be loaded, and loaded before it can be searched or
/// queried.
pub struct MockCatalogStore {
    collections: RwLock<HashMap<String, MockCollection>>,
    ready: AtomicBool,
    fail_search: AtomicBool,
    search_calls: AtomicUsize,
    release_calls: AtomicUsize,
}

struct MockCollection {
    schema: CollectionSchema,
    index: Option<IndexParams>,
    loaded: bool,
    records: Vec<TermRecord>,
}

impl Default for MockCatalogStore {
    fn default() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            ready: AtomicBool::new(true),
            fail_search: AtomicBool::new(false),
            search_calls: AtomicUsize::new(0),
            release_calls: AtomicUsize::new(0),
        }
    }
}

impl MockCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store holding one indexed (not yet loaded) collection.
    pub fn with_catalog(name: &str, schema: CollectionSchema, records: Vec<TermRecord>) -> Self {
        let store = Self::new();
        if let Ok(mut collections) = store.collections.write() {
            collections.insert(
                name.to_string(),
                MockCollection {
                    index: Some(IndexParams {
                        metric: schema.metric,
                        ..IndexParams::vector_cosine()
                    }),
                    schema,
                    loaded: false,
                    records,
                },
            );
        }
        store
    }

    pub fn record_count(&self, name: &str) -> Option<usize> {
        self.collections
            .read()
            .ok()?
            .get(name)
            .map(|c| c.records.len())
    }

    /// Stored records of `name`, in insertion order.
    pub fn records(&self, name: &str) -> Vec<TermRecord> {
        self.collections
            .read()
            .ok()
            .and_then(|c| c.get(name).map(|c| c.records.clone()))
            .unwrap_or_default()
    }

    pub fn is_indexed(&self, name: &str) -> bool {
        self.collections
            .read()
            .ok()
            .and_then(|c| c.get(name).map(|c| c.index.is_some()))
            .unwrap_or(false)
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.collections
            .read()
            .ok()
            .and_then(|c| c.get(name).map(|c| c.loaded))
            .unwrap_or(false)
    }

    /// Makes every subsequent search fail.
    pub fn set_search_failure(&self, fail: bool) {
        self.fail_search.store(fail, Ordering::SeqCst);
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn release_calls(&self) -> usize {
        self.release_calls.load(Ordering::SeqCst)
    }

    fn poisoned(collection: &str) -> VectorDbError {
        VectorDbError::QueryFailed {
            collection: collection.to_string(),
            message: "lock poisoned".to_string(),
        }
    }
}

impl CatalogStore for MockCatalogStore {
    async fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    async fn has_collection(&self, name: &str) -> Result<bool, VectorDbError> {
        let collections = self.collections.read().map_err(|_| Self::poisoned(name))?;
        Ok(collections.contains_key(name))
    }

    async fn collection_dimension(&self, name: &str) -> Result<Option<usize>, VectorDbError> {
        let collections = self.collections.read().map_err(|_| Self::poisoned(name))?;
        Ok(collections.get(name).map(|c| c.schema.dimension))
    }

    async fn load_collection(&self, name: &str) -> Result<(), VectorDbError> {
        let mut collections = self.collections.write().map_err(|_| Self::poisoned(name))?;
        let coll = collections
            .get_mut(name)
            .ok_or_else(|| VectorDbError::CollectionNotFound {
                collection: name.to_string(),
            })?;

        if coll.index.is_none() {
            return Err(VectorDbError::LifecycleFailed {
                action: "load",
                collection: name.to_string(),
                message: "index not found".to_string(),
            });
        }

        coll.loaded = true;
        Ok(())
    }

    async fn release_collection(&self, name: &str) -> Result<(), VectorDbError> {
        self.release_calls.fetch_add(1, Ordering::SeqCst);
        let mut collections = self.collections.write().map_err(|_| Self::poisoned(name))?;
        if let Some(coll) = collections.get_mut(name) {
            coll.loaded = false;
        }
        Ok(())
    }

    async fn create_collection(
        &self,
        name: &str,
        schema: &CollectionSchema,
    ) -> Result<(), VectorDbError> {
        let mut collections =
            self.collections
                .write()
                .map_err(|_| VectorDbError::CreateCollectionFailed {
                    collection: name.to_string(),
                    message: "lock poisoned".to_string(),
                })?;

        if collections.contains_key(name) {
            return Err(VectorDbError::CreateCollectionFailed {
                collection: name.to_string(),
                message: "collection already exists".to_string(),
            });
        }

        collections.insert(
            name.to_string(),
            MockCollection {
                schema: schema.clone(),
                index: None,
                loaded: false,
                records: Vec::new(),
            },
        );
        Ok(())
    }

    async fn drop_collection(&self, name: &str) -> Result<(), VectorDbError> {
        let mut collections = self.collections.write().map_err(|_| Self::poisoned(name))?;
        collections.remove(name);
        Ok(())
    }

    async fn create_index(&self, name: &str, params: &IndexParams) -> Result<(), VectorDbError> {
        let mut collections = self.collections.write().map_err(|_| Self::poisoned(name))?;
        let coll = collections
            .get_mut(name)
            .ok_or_else(|| VectorDbError::CollectionNotFound {
                collection: name.to_string(),
            })?;

        if coll.schema.metric != params.metric {
            return Err(VectorDbError::IndexFailed {
                collection: name.to_string(),
                message: format!(
                    "collection metric is {}, index requested {}",
                    coll.schema.metric, params.metric
                ),
            });
        }

        coll.index = Some(params.clone());
        Ok(())
    }

    async fn insert(
        &self,
        name: &str,
        records: Vec<TermRecord>,
    ) -> Result<InsertSummary, VectorDbError> {
        let mut collections =
            self.collections
                .write()
                .map_err(|_| VectorDbError::InsertFailed {
                    collection: name.to_string(),
                    message: "lock poisoned".to_string(),
                })?;

        let coll = collections
            .get_mut(name)
            .ok_or_else(|| VectorDbError::CollectionNotFound {
                collection: name.to_string(),
            })?;

        for record in &records {
            coll.schema.validate_record(record)?;
        }

        let inserted = records.len();
        coll.records.extend(records);
        Ok(InsertSummary { inserted })
    }

    async fn search(
        &self,
        name: &str,
        vector: &[f32],
        limit: usize,
        filter: Option<&TermFilter>,
    ) -> Result<Vec<TermHit>, VectorDbError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_search.load(Ordering::SeqCst) {
            return Err(VectorDbError::SearchFailed {
                collection: name.to_string(),
                message: "injected failure".to_string(),
            });
        }

        let collections = self
            .collections
            .read()
            .map_err(|_| VectorDbError::SearchFailed {
                collection: name.to_string(),
                message: "lock poisoned".to_string(),
            })?;

        let coll = collections
            .get(name)
            .ok_or_else(|| VectorDbError::CollectionNotFound {
                collection: name.to_string(),
            })?;

        if !coll.loaded {
            return Err(VectorDbError::CollectionNotLoaded {
                collection: name.to_string(),
            });
        }

        if vector.len() != coll.schema.dimension {
            return Err(VectorDbError::InvalidDimension {
                expected: coll.schema.dimension,
                actual: vector.len(),
            });
        }

        let metric = coll.schema.metric;
        let mut hits: Vec<TermHit> = coll
            .records
            .iter()
            .filter(|r| filter.is_none_or(|f| f.matches(r)))
            .map(|r| TermHit {
                attributes: r.attributes.clone(),
                distance: metric.distance(vector, &r.vector),
            })
            .collect();

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits.truncate(limit);
        Ok(hits)
    }

    async fn query(
        &self,
        name: &str,
        filter: &TermFilter,
        limit: usize,
    ) -> Result<Vec<TermAttributes>, VectorDbError> {
        let collections = self.collections.read().map_err(|_| Self::poisoned(name))?;
        let coll = collections
            .get(name)
            .ok_or_else(|| VectorDbError::CollectionNotFound {
                collection: name.to_string(),
            })?;

        if !coll.loaded {
            return Err(VectorDbError::CollectionNotLoaded {
                collection: name.to_string(),
            });
        }

        Ok(coll
            .records
            .iter()
            .filter(|r| filter.matches(r))
            .take(limit)
            .map(|r| r.attributes.clone())
            .collect())
    }
}
