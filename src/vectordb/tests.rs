use super::*;

const TEST_COLLECTION: &str = "finance_bge_m3__finance_terms";
const DIM: usize = 4;

fn unit(i: usize) -> Vec<f32> {
    let mut v = vec![0.0; DIM];
    v[i % DIM] = 1.0;
    v
}

fn record(id: &str, name: &str, term_type: &str, vector: Vec<f32>) -> TermRecord {
    TermRecord::new(TermAttributes::new(id, name, "FINTERM", term_type), vector)
}

async fn ready_store() -> MockCatalogStore {
    let store = MockCatalogStore::new();
    store
        .create_collection(TEST_COLLECTION, &CollectionSchema::finance_terms(DIM))
        .await
        .unwrap();
    store
        .create_index(TEST_COLLECTION, &IndexParams::vector_cosine())
        .await
        .unwrap();
    store
        .insert(
            TEST_COLLECTION,
            vec![
                record("1", "bond", "instrument", unit(0)),
                record("2", "equity", "instrument", unit(1)),
                record("3", "liquidity", "metric", unit(2)),
            ],
        )
        .await
        .unwrap();
    store.load_collection(TEST_COLLECTION).await.unwrap();
    store
}

#[test]
fn test_qualified_collection_name() {
    assert_eq!(
        qualified_collection_name("finance_bge_m3", "finance_terms"),
        "finance_bge_m3__finance_terms"
    );
}

#[test]
fn test_cosine_distance_is_lower_is_better() {
    let metric = DistanceMetric::Cosine;
    assert!(metric.distance(&unit(0), &unit(0)).abs() < 1e-6);
    assert!((metric.distance(&unit(0), &unit(1)) - 1.0).abs() < 1e-6);
    assert!((metric.distance_from_score(0.75) - 0.25).abs() < 1e-6);
}

#[test]
fn test_euclidean_distance() {
    let metric = DistanceMetric::Euclidean;
    let d = metric.distance(&[0.0, 0.0], &[3.0, 4.0]);
    assert!((d - 5.0).abs() < 1e-6);
    assert_eq!(metric.distance_from_score(2.5), 2.5);
}

#[test]
fn test_cosine_similarity_degenerate_inputs() {
    assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
}

#[test]
fn test_schema_rejects_wrong_dimension() {
    let schema = CollectionSchema::finance_terms(DIM);
    let err = schema
        .validate_record(&record("1", "bond", "t", vec![1.0; 3]))
        .unwrap_err();
    assert!(matches!(
        err,
        VectorDbError::InvalidDimension {
            expected: 4,
            actual: 3
        }
    ));
}

#[test]
fn test_schema_rejects_long_term_id() {
    let schema = CollectionSchema::finance_terms(DIM);
    let long_id = "x".repeat(51);
    let err = schema
        .validate_record(&record(&long_id, "bond", "t", unit(0)))
        .unwrap_err();
    assert!(matches!(
        err,
        VectorDbError::FieldTooLong {
            field: "term_id",
            max: 50,
            actual: 51
        }
    ));
}

#[test]
fn test_schema_counts_chars_not_bytes() {
    let schema = CollectionSchema::finance_terms(DIM);
    let name = "é".repeat(500);
    assert!(schema
        .validate_record(&record("1", &name, "t", unit(0)))
        .is_ok());
}

#[test]
fn test_schema_checks_input_file() {
    let schema = CollectionSchema::finance_terms(DIM);
    let rec = record("1", "bond", "t", unit(0)).with_input_file(&"p".repeat(501));
    assert!(matches!(
        schema.validate_record(&rec),
        Err(VectorDbError::FieldTooLong {
            field: "input_file",
            ..
        })
    ));
}

#[test]
fn test_filter_matches_all_conditions() {
    let rec = record("7", "bond", "instrument", unit(0)).with_input_file("glossary.csv");
    let filter = TermFilter::new()
        .eq(TermField::TermCategory, "FINTERM")
        .eq(TermField::TermType, "instrument");
    assert!(filter.matches(&rec));
    assert!(TermFilter::new().matches(&rec));
    assert!(TermFilter::new().eq(TermField::InputFile, "glossary.csv").matches(&rec));
    assert!(!filter.eq(TermField::TermId, "8").matches(&rec));
}

#[test]
fn test_filter_on_absent_optional_field() {
    let rec = record("1", "bond", "t", unit(0));
    assert!(!TermFilter::new().eq(TermField::Definition, "").matches(&rec));
}

#[test]
fn test_generate_point_id_unique() {
    assert_ne!(generate_point_id(), generate_point_id());
}

#[tokio::test]
async fn test_collection_lifecycle() {
    let store = MockCatalogStore::new();
    assert!(!store.has_collection(TEST_COLLECTION).await.unwrap());
    assert_eq!(store.collection_dimension(TEST_COLLECTION).await.unwrap(), None);

    store
        .create_collection(TEST_COLLECTION, &CollectionSchema::finance_terms(DIM))
        .await
        .unwrap();
    assert!(store.has_collection(TEST_COLLECTION).await.unwrap());
    assert_eq!(
        store.collection_dimension(TEST_COLLECTION).await.unwrap(),
        Some(DIM)
    );

    store.drop_collection(TEST_COLLECTION).await.unwrap();
    assert!(!store.has_collection(TEST_COLLECTION).await.unwrap());
    store.drop_collection(TEST_COLLECTION).await.unwrap();
}

#[tokio::test]
async fn test_create_existing_collection_fails() {
    let store = ready_store().await;
    let err = store
        .create_collection(TEST_COLLECTION, &CollectionSchema::finance_terms(DIM))
        .await
        .unwrap_err();
    assert!(matches!(err, VectorDbError::CreateCollectionFailed { .. }));
}

#[tokio::test]
async fn test_load_requires_index() {
    let store = MockCatalogStore::new();
    store
        .create_collection(TEST_COLLECTION, &CollectionSchema::finance_terms(DIM))
        .await
        .unwrap();

    let err = store.load_collection(TEST_COLLECTION).await.unwrap_err();
    assert!(matches!(err, VectorDbError::LifecycleFailed { action: "load", .. }));
}

#[tokio::test]
async fn test_index_metric_mismatch() {
    let store = MockCatalogStore::new();
    store
        .create_collection(TEST_COLLECTION, &CollectionSchema::finance_terms(DIM))
        .await
        .unwrap();

    let params = IndexParams {
        metric: DistanceMetric::Euclidean,
        ..IndexParams::vector_cosine()
    };
    let err = store.create_index(TEST_COLLECTION, &params).await.unwrap_err();
    assert!(matches!(err, VectorDbError::IndexFailed { .. }));
}

#[tokio::test]
async fn test_load_and_release_are_idempotent() {
    let store = ready_store().await;
    store.load_collection(TEST_COLLECTION).await.unwrap();
    assert!(store.is_loaded(TEST_COLLECTION));

    store.release_collection(TEST_COLLECTION).await.unwrap();
    store.release_collection(TEST_COLLECTION).await.unwrap();
    assert!(!store.is_loaded(TEST_COLLECTION));
    assert_eq!(store.release_calls(), 2);

    store.release_collection("missing").await.unwrap();
}

#[tokio::test]
async fn test_search_requires_loaded_collection() {
    let store = ready_store().await;
    store.release_collection(TEST_COLLECTION).await.unwrap();

    let err = store
        .search(TEST_COLLECTION, &unit(0), 5, None)
        .await
        .unwrap_err();
    assert!(matches!(err, VectorDbError::CollectionNotLoaded { .. }));
}

#[tokio::test]
async fn test_search_sorted_by_ascending_distance() {
    let store = ready_store().await;
    let query = vec![0.9, 0.4, 0.1, 0.0];

    let hits = store
        .search(TEST_COLLECTION, &query, 5, None)
        .await
        .unwrap();

    assert_eq!(hits.len(), 3);
    assert_eq!(hits[0].attributes.term_name, "bond");
    assert_eq!(hits[1].attributes.term_name, "equity");
    assert_eq!(hits[2].attributes.term_name, "liquidity");
    assert!(hits.windows(2).all(|w| w[0].distance <= w[1].distance));
}

#[tokio::test]
async fn test_search_truncates_to_limit() {
    let store = ready_store().await;
    let hits = store
        .search(TEST_COLLECTION, &unit(2), 1, None)
        .await
        .unwrap();

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].attributes.term_id, "3");
    assert!(hits[0].distance.abs() < 1e-6);
}

#[tokio::test]
async fn test_search_with_filter() {
    let store = ready_store().await;
    let filter = TermFilter::new().eq(TermField::TermType, "metric");

    let hits = store
        .search(TEST_COLLECTION, &unit(0), 5, Some(&filter))
        .await
        .unwrap();

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].attributes.term_name, "liquidity");
}

#[tokio::test]
async fn test_search_dimension_mismatch() {
    let store = ready_store().await;
    let err = store
        .search(TEST_COLLECTION, &[1.0, 0.0], 5, None)
        .await
        .unwrap_err();
    assert!(matches!(err, VectorDbError::InvalidDimension { .. }));
}

#[tokio::test]
async fn test_search_missing_collection() {
    let store = MockCatalogStore::new();
    let err = store.search("nope", &unit(0), 5, None).await.unwrap_err();
    assert!(matches!(err, VectorDbError::CollectionNotFound { .. }));
}

#[tokio::test]
async fn test_injected_search_failure() {
    let store = ready_store().await;
    store.set_search_failure(true);

    let err = store
        .search(TEST_COLLECTION, &unit(0), 5, None)
        .await
        .unwrap_err();
    assert!(matches!(err, VectorDbError::SearchFailed { .. }));
    assert_eq!(store.search_calls(), 1);
}

#[tokio::test]
async fn test_insert_rejects_invalid_batch_atomically() {
    let store = ready_store().await;
    let err = store
        .insert(
            TEST_COLLECTION,
            vec![
                record("4", "swap", "instrument", unit(3)),
                record("5", "option", "instrument", vec![1.0; 2]),
            ],
        )
        .await
        .unwrap_err();

    assert!(matches!(err, VectorDbError::InvalidDimension { .. }));
    assert_eq!(store.record_count(TEST_COLLECTION), Some(3));
}

#[tokio::test]
async fn test_query_by_attribute() {
    let store = ready_store().await;

    let all = store
        .query(TEST_COLLECTION, &TermFilter::new(), 10)
        .await
        .unwrap();
    assert_eq!(all.len(), 3);

    let instruments = store
        .query(
            TEST_COLLECTION,
            &TermFilter::new().eq(TermField::TermType, "instrument"),
            1,
        )
        .await
        .unwrap();
    assert_eq!(instruments.len(), 1);
    assert_eq!(instruments[0].term_name, "bond");
}

#[tokio::test]
async fn test_zero_limit_query_returns_nothing() {
    let store = ready_store().await;
    let rows = store
        .query(TEST_COLLECTION, &TermFilter::new(), 0)
        .await
        .unwrap();
    assert!(rows.is_empty());

    // Answered locally, so no Qdrant needs to be listening.
    let qdrant = QdrantCatalog::new("http://127.0.0.1:1").unwrap();
    let rows = qdrant
        .query(TEST_COLLECTION, &TermFilter::new(), 0)
        .await
        .unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_readiness_toggle() {
    let store = MockCatalogStore::new();
    assert!(store.is_ready().await);
    store.set_ready(false);
    assert!(!store.is_ready().await);
}

#[test]
fn test_term_attributes_serialize_optional_fields() {
    let attrs = TermAttributes::new("1", "bond", "FINTERM", "instrument").with_definition("debt");
    let value = serde_json::to_value(&attrs).unwrap();
    assert_eq!(value["definition"], "debt");
    assert!(value["synonyms"].is_null());
}
