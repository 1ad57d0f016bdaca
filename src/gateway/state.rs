use std::sync::Arc;

use crate::embedding::Embedder;
use crate::standardize::{CatalogHandle, Standardizer};
use crate::vectordb::CatalogStore;

pub struct HandlerState<E: Embedder + 'static, S: CatalogStore + 'static> {
    pub standardizer: Arc<Standardizer<E, S>>,

    /// Fills in whatever `embeddingOptions` a request leaves out.
    pub default_handle: CatalogHandle,

    pub embedder_stub: bool,
}

impl<E: Embedder + 'static, S: CatalogStore + 'static> Clone for HandlerState<E, S> {
    fn clone(&self) -> Self {
        Self {
            standardizer: Arc::clone(&self.standardizer),
            default_handle: self.default_handle.clone(),
            embedder_stub: self.embedder_stub,
        }
    }
}

impl<E: Embedder + 'static, S: CatalogStore + 'static> HandlerState<E, S> {
    /// The default handle names the standardizer's embedder and the given catalog.
    pub fn new(
        standardizer: Arc<Standardizer<E, S>>,
        db_name: &str,
        collection_name: &str,
    ) -> Self {
        let embedder = standardizer.embedder();
        let default_handle = CatalogHandle::new(
            embedder.provider(),
            embedder.model(),
            db_name,
            collection_name,
        );
        Self {
            standardizer,
            default_handle,
            embedder_stub: false,
        }
    }

    pub fn with_embedder_stub(mut self, stub: bool) -> Self {
        self.embedder_stub = stub;
        self
    }
}
