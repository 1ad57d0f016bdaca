use thiserror::Error;

#[derive(Debug, Error)]
/// Errors returned by catalog store operations.
pub enum VectorDbError {
    /// Could not connect to the store endpoint.
    #[error("failed to connect to catalog store at '{url}': {message}")]
    ConnectionFailed {
        /// Endpoint URL.
        url: String,
        /// Error message.
        message: String,
    },

    /// Collection does not exist.
    #[error("collection not found: {collection}")]
    CollectionNotFound {
        /// Collection name.
        collection: String,
    },

    /// Collection exists but has not been loaded for search.
    #[error("collection not loaded: {collection}")]
    CollectionNotLoaded {
        /// Collection name.
        collection: String,
    },

    /// Collection creation failed.
    #[error("failed to create collection '{collection}': {message}")]
    CreateCollectionFailed {
        /// Collection name.
        collection: String,
        /// Error message.
        message: String,
    },

    /// Collection drop failed.
    #[error("failed to drop collection '{collection}': {message}")]
    DropCollectionFailed {
        /// Collection name.
        collection: String,
        /// Error message.
        message: String,
    },

    /// Index creation failed (includes metric mismatches).
    #[error("failed to index '{collection}': {message}")]
    IndexFailed {
        /// Collection name.
        collection: String,
        /// Error message.
        message: String,
    },

    /// Insert failed.
    #[error("failed to insert records into '{collection}': {message}")]
    InsertFailed {
        /// Collection name.
        collection: String,
        /// Error message.
        message: String,
    },

    /// Vector search failed.
    #[error("failed to search in '{collection}': {message}")]
    SearchFailed {
        /// Collection name.
        collection: String,
        /// Error message.
        message: String,
    },

    /// Attribute query failed.
    #[error("failed to query '{collection}': {message}")]
    QueryFailed {
        /// Collection name.
        collection: String,
        /// Error message.
        message: String,
    },

    /// Load or release failed.
    #[error("failed to {action} collection '{collection}': {message}")]
    LifecycleFailed {
        /// `load` or `release`.
        action: &'static str,
        /// Collection name.
        collection: String,
        /// Error message.
        message: String,
    },

    /// A string field exceeds its schema bound.
    #[error("field '{field}' is {actual} chars, exceeds max {max}")]
    FieldTooLong {
        /// Field name.
        field: &'static str,
        /// Schema bound.
        max: usize,
        /// Actual length in chars.
        actual: usize,
    },

    /// Vector dimension mismatch.
    #[error("invalid vector dimension: expected {expected}, got {actual}")]
    InvalidDimension {
        /// Expected dimension.
        expected: usize,
        /// Actual dimension.
        actual: usize,
    },
}
