use std::collections::HashMap;
use std::future::Future;

use parking_lot::RwLock;
use qdrant_client::Qdrant;
use qdrant_client::qdrant::vectors_config::Config as VectorsConfigKind;
use qdrant_client::qdrant::{
    Condition, CreateCollectionBuilder, CreateFieldIndexCollectionBuilder,
    DeleteCollectionBuilder, Distance, FieldType, Filter, PointStruct, ScrollPointsBuilder,
    SearchPointsBuilder, UpsertPointsBuilder, Value, VectorParamsBuilder,
};
use tracing::{debug, info, warn};

use super::error::VectorDbError;
use super::model::{
    CollectionSchema, DistanceMetric, IndexParams, InsertSummary, TermAttributes, TermField,
    TermFilter, TermHit, TermRecord, generate_point_id,
};

/// Persistent term catalog: collection lifecycle, insert, vector search and
/// attribute query.
///
/// Distances returned by [`search`](CatalogStore::search) are lower-is-better
/// regardless of the collection metric.
pub trait CatalogStore: Send + Sync {
    /// Returns `true` if the backing store answers a health check.
    fn is_ready(&self) -> impl Future<Output = bool> + Send;

    fn has_collection(&self, name: &str)
    -> impl Future<Output = Result<bool, VectorDbError>> + Send;

    /// Vector dimension of `name`, or `None` if the collection does not exist.
    fn collection_dimension(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<usize>, VectorDbError>> + Send;

    /// Makes the collection searchable. Idempotent.
    fn load_collection(&self, name: &str) -> impl Future<Output = Result<(), VectorDbError>> + Send;

    /// Frees search resources held for the collection. Idempotent.
    fn release_collection(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<(), VectorDbError>> + Send;

    fn create_collection(
        &self,
        name: &str,
        schema: &CollectionSchema,
    ) -> impl Future<Output = Result<(), VectorDbError>> + Send;

    /// Deletes the collection and all records. No-op if absent.
    fn drop_collection(&self, name: &str) -> impl Future<Output = Result<(), VectorDbError>> + Send;

    fn create_index(
        &self,
        name: &str,
        params: &IndexParams,
    ) -> impl Future<Output = Result<(), VectorDbError>> + Send;

    fn insert(
        &self,
        name: &str,
        records: Vec<TermRecord>,
    ) -> impl Future<Output = Result<InsertSummary, VectorDbError>> + Send;

    /// Returns up to `limit` nearest records, sorted by ascending distance.
    fn search(
        &self,
        name: &str,
        vector: &[f32],
        limit: usize,
        filter: Option<&TermFilter>,
    ) -> impl Future<Output = Result<Vec<TermHit>, VectorDbError>> + Send;

    /// Attribute-only lookup.
    fn query(
        &self,
        name: &str,
        filter: &TermFilter,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<TermAttributes>, VectorDbError>> + Send;
}

#[derive(Debug, Clone, Copy)]
struct CollectionMeta {
    dimension: usize,
    metric: DistanceMetric,
}

/// [`CatalogStore`] backed by Qdrant.
///
/// Qdrant keeps collections resident, so load and release only verify
/// existence and cache the collection's metric for score conversion.
pub struct QdrantCatalog {
    client: Qdrant,
    url: String,
    loaded: RwLock<HashMap<String, CollectionMeta>>,
}

impl std::fmt::Debug for QdrantCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QdrantCatalog")
            .field("url", &self.url)
            .field("loaded", &self.loaded.read().len())
            .finish()
    }
}

impl QdrantCatalog {
    /// Creates a client for `url`. No request is sent.
    pub fn new(url: &str) -> Result<Self, VectorDbError> {
        let client =
            Qdrant::from_url(url)
                .build()
                .map_err(|e| VectorDbError::ConnectionFailed {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;

        Ok(Self {
            client,
            url: url.to_string(),
            loaded: RwLock::new(HashMap::new()),
        })
    }

    /// Returns the configured URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Performs a basic health check request.
    pub async fn health_check(&self) -> Result<(), VectorDbError> {
        self.client
            .health_check()
            .await
            .map_err(|e| VectorDbError::ConnectionFailed {
                url: self.url.clone(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    async fn exists(&self, name: &str) -> Result<bool, VectorDbError> {
        self.client
            .collection_exists(name)
            .await
            .map_err(|e| VectorDbError::ConnectionFailed {
                url: self.url.clone(),
                message: e.to_string(),
            })
    }

    async fn fetch_meta(&self, name: &str) -> Result<Option<CollectionMeta>, VectorDbError> {
        if !self.exists(name).await? {
            return Ok(None);
        }

        let info = self.client.collection_info(name).await.map_err(|e| {
            VectorDbError::QueryFailed {
                collection: name.to_string(),
                message: e.to_string(),
            }
        })?;

        let params = info
            .result
            .and_then(|r| r.config)
            .and_then(|c| c.params)
            .and_then(|p| p.vectors_config)
            .and_then(|v| v.config);

        match params {
            Some(VectorsConfigKind::Params(params)) => {
                let metric = if params.distance == Distance::Euclid as i32 {
                    DistanceMetric::Euclidean
                } else {
                    DistanceMetric::Cosine
                };
                Ok(Some(CollectionMeta {
                    dimension: params.size as usize,
                    metric,
                }))
            }
            _ => Err(VectorDbError::QueryFailed {
                collection: name.to_string(),
                message: "collection has no single unnamed vector".to_string(),
            }),
        }
    }

    async fn meta(&self, name: &str) -> Result<CollectionMeta, VectorDbError> {
        if let Some(meta) = self.loaded.read().get(name).copied() {
            return Ok(meta);
        }

        self.fetch_meta(name)
            .await?
            .ok_or_else(|| VectorDbError::CollectionNotFound {
                collection: name.to_string(),
            })
    }
}

fn to_filter(filter: &TermFilter) -> Filter {
    Filter::must(
        filter
            .conditions()
            .iter()
            .map(|(field, value)| Condition::matches(field.as_str(), value.clone())),
    )
}

fn to_payload(record: TermRecord) -> HashMap<String, Value> {
    let attrs = record.attributes;
    let mut payload: HashMap<String, Value> = HashMap::new();
    payload.insert(TermField::TermId.as_str().to_string(), attrs.term_id.into());
    payload.insert(TermField::TermName.as_str().to_string(), attrs.term_name.into());
    payload.insert(
        TermField::TermCategory.as_str().to_string(),
        attrs.term_category.into(),
    );
    payload.insert(TermField::TermType.as_str().to_string(), attrs.term_type.into());
    if let Some(definition) = attrs.definition {
        payload.insert(TermField::Definition.as_str().to_string(), definition.into());
    }
    if let Some(synonyms) = attrs.synonyms {
        payload.insert(TermField::Synonyms.as_str().to_string(), synonyms.into());
    }
    if let Some(input_file) = record.input_file {
        payload.insert(TermField::InputFile.as_str().to_string(), input_file.into());
    }
    payload
}

/// Projects a payload onto the six descriptive attributes.
fn attributes_from_payload(payload: &HashMap<String, Value>) -> Option<TermAttributes> {
    let text = |field: TermField| {
        payload
            .get(field.as_str())
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
    };

    Some(TermAttributes {
        term_id: text(TermField::TermId)?,
        term_name: text(TermField::TermName)?,
        term_category: text(TermField::TermCategory).unwrap_or_default(),
        term_type: text(TermField::TermType).unwrap_or_default(),
        definition: text(TermField::Definition),
        synonyms: text(TermField::Synonyms),
    })
}

impl CatalogStore for QdrantCatalog {
    async fn is_ready(&self) -> bool {
        self.health_check().await.is_ok()
    }

    async fn has_collection(&self, name: &str) -> Result<bool, VectorDbError> {
        self.exists(name).await
    }

    async fn collection_dimension(&self, name: &str) -> Result<Option<usize>, VectorDbError> {
        Ok(self.fetch_meta(name).await?.map(|m| m.dimension))
    }

    async fn load_collection(&self, name: &str) -> Result<(), VectorDbError> {
        if self.loaded.read().contains_key(name) {
            return Ok(());
        }

        let meta = self
            .fetch_meta(name)
            .await
            .map_err(|e| VectorDbError::LifecycleFailed {
                action: "load",
                collection: name.to_string(),
                message: e.to_string(),
            })?
            .ok_or_else(|| VectorDbError::CollectionNotFound {
                collection: name.to_string(),
            })?;

        self.loaded.write().insert(name.to_string(), meta);
        debug!(collection = name, dimension = meta.dimension, metric = %meta.metric, "Collection loaded");
        Ok(())
    }

    async fn release_collection(&self, name: &str) -> Result<(), VectorDbError> {
        if self.loaded.write().remove(name).is_some() {
            debug!(collection = name, "Collection released");
        }
        Ok(())
    }

    async fn create_collection(
        &self,
        name: &str,
        schema: &CollectionSchema,
    ) -> Result<(), VectorDbError> {
        let distance = match schema.metric {
            DistanceMetric::Cosine => Distance::Cosine,
            DistanceMetric::Euclidean => Distance::Euclid,
        };
        let vectors_config = VectorParamsBuilder::new(schema.dimension as u64, distance);

        self.client
            .create_collection(
                CreateCollectionBuilder::new(name)
                    .vectors_config(vectors_config)
                    .on_disk_payload(true),
            )
            .await
            .map_err(|e| VectorDbError::CreateCollectionFailed {
                collection: name.to_string(),
                message: e.to_string(),
            })?;

        info!(
            collection = name,
            dimension = schema.dimension,
            metric = %schema.metric,
            "Collection created"
        );
        Ok(())
    }

    async fn drop_collection(&self, name: &str) -> Result<(), VectorDbError> {
        self.loaded.write().remove(name);

        if !self.exists(name).await? {
            return Ok(());
        }

        self.client
            .delete_collection(DeleteCollectionBuilder::new(name))
            .await
            .map_err(|e| VectorDbError::DropCollectionFailed {
                collection: name.to_string(),
                message: e.to_string(),
            })?;

        info!(collection = name, "Collection dropped");
        Ok(())
    }

    async fn create_index(&self, name: &str, params: &IndexParams) -> Result<(), VectorDbError> {
        let meta = self
            .fetch_meta(name)
            .await?
            .ok_or_else(|| VectorDbError::CollectionNotFound {
                collection: name.to_string(),
            })?;

        // The vector index itself is built by Qdrant on creation.
        if meta.metric != params.metric {
            return Err(VectorDbError::IndexFailed {
                collection: name.to_string(),
                message: format!(
                    "collection metric is {}, index requested {}",
                    meta.metric, params.metric
                ),
            });
        }

        for field in [TermField::TermCategory, TermField::TermType] {
            self.client
                .create_field_index(CreateFieldIndexCollectionBuilder::new(
                    name,
                    field.as_str(),
                    FieldType::Keyword,
                ))
                .await
                .map_err(|e| VectorDbError::IndexFailed {
                    collection: name.to_string(),
                    message: e.to_string(),
                })?;
        }

        info!(collection = name, field = %params.field, metric = %params.metric, "Index created");
        Ok(())
    }

    async fn insert(
        &self,
        name: &str,
        records: Vec<TermRecord>,
    ) -> Result<InsertSummary, VectorDbError> {
        if records.is_empty() {
            return Ok(InsertSummary::default());
        }

        let count = records.len();
        let points: Vec<PointStruct> = records
            .into_iter()
            .map(|mut record| {
                let vector = std::mem::take(&mut record.vector);
                PointStruct::new(generate_point_id(), vector, to_payload(record))
            })
            .collect();

        self.client
            .upsert_points(UpsertPointsBuilder::new(name, points).wait(true))
            .await
            .map_err(|e| VectorDbError::InsertFailed {
                collection: name.to_string(),
                message: e.to_string(),
            })?;

        debug!(collection = name, count, "Records inserted");
        Ok(InsertSummary { inserted: count })
    }

    async fn search(
        &self,
        name: &str,
        vector: &[f32],
        limit: usize,
        filter: Option<&TermFilter>,
    ) -> Result<Vec<TermHit>, VectorDbError> {
        let meta = self.meta(name).await?;
        if vector.len() != meta.dimension {
            return Err(VectorDbError::InvalidDimension {
                expected: meta.dimension,
                actual: vector.len(),
            });
        }

        let mut builder =
            SearchPointsBuilder::new(name, vector.to_vec(), limit as u64).with_payload(true);
        if let Some(filter) = filter.filter(|f| !f.is_empty()) {
            builder = builder.filter(to_filter(filter));
        }

        let response =
            self.client
                .search_points(builder)
                .await
                .map_err(|e| VectorDbError::SearchFailed {
                    collection: name.to_string(),
                    message: e.to_string(),
                })?;

        let mut hits: Vec<TermHit> = response
            .result
            .into_iter()
            .filter_map(|point| {
                let attributes = attributes_from_payload(&point.payload);
                if attributes.is_none() {
                    warn!(collection = name, "Skipping hit with incomplete payload");
                }
                Some(TermHit {
                    attributes: attributes?,
                    distance: meta.metric.distance_from_score(point.score),
                })
            })
            .collect();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));

        debug!(collection = name, hits = hits.len(), "Vector search complete");
        Ok(hits)
    }

    async fn query(
        &self,
        name: &str,
        filter: &TermFilter,
        limit: usize,
    ) -> Result<Vec<TermAttributes>, VectorDbError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let mut builder = ScrollPointsBuilder::new(name)
            .limit(limit.min(u32::MAX as usize) as u32)
            .with_payload(true);
        if !filter.is_empty() {
            builder = builder.filter(to_filter(filter));
        }

        let response = self
            .client
            .scroll(builder)
            .await
            .map_err(|e| VectorDbError::QueryFailed {
                collection: name.to_string(),
                message: e.to_string(),
            })?;

        Ok(response
            .result
            .iter()
            .filter_map(|point| attributes_from_payload(&point.payload))
            .collect())
    }
}
