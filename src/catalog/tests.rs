use std::io::Write;
use std::sync::Arc;

use super::*;
use crate::constants::{DIMENSION_PROBE_TEXT, MAX_TERM_NAME_LEN};
use crate::embedding::{MockEmbedder, StubEmbedder};
use crate::vectordb::{
    CatalogStore, CollectionSchema, MockCatalogStore, TermAttributes, TermRecord, VectorDbError,
};

const DIM: usize = 8;
const COLLECTION: &str = "finance_bge_m3__finance_terms";

fn rows(names: &[&str]) -> Vec<GlossaryRow> {
    names.iter().map(|n| GlossaryRow::new(n, "NA")).collect()
}

fn builder(
    embedder: MockEmbedder,
) -> (CatalogBuilder<MockEmbedder, MockCatalogStore>, Arc<MockCatalogStore>) {
    let store = Arc::new(MockCatalogStore::new());
    (
        CatalogBuilder::new(Arc::new(embedder), Arc::clone(&store)),
        store,
    )
}

mod glossary_tests {
    use super::*;

    #[test]
    fn test_parse_two_columns() {
        let parsed = parse_glossary("net income,ACCOUNTING\nbond,SECURITIES\n".as_bytes()).unwrap();
        assert_eq!(
            parsed,
            vec![
                GlossaryRow::new("net income", "ACCOUNTING"),
                GlossaryRow::new("bond", "SECURITIES"),
            ]
        );
    }

    #[test]
    fn test_missing_cells_become_na() {
        let parsed = parse_glossary("equity\n,BANKING\nswap,\n".as_bytes()).unwrap();
        assert_eq!(
            parsed,
            vec![
                GlossaryRow::new("equity", "NA"),
                GlossaryRow::new("NA", "BANKING"),
                GlossaryRow::new("swap", "NA"),
            ]
        );
    }

    #[test]
    fn test_first_line_is_data() {
        let parsed = parse_glossary("term_name,term_type\n".as_bytes()).unwrap();
        assert_eq!(parsed, vec![GlossaryRow::new("term_name", "term_type")]);
    }

    #[test]
    fn test_quoted_commas() {
        let parsed = parse_glossary("\"loans, net\",BANKING\n".as_bytes()).unwrap();
        assert_eq!(parsed[0].term_name, "loans, net");
    }

    #[test]
    fn test_read_glossary_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "derivative,DERIVATIVES").unwrap();
        writeln!(file, "collateral").unwrap();
        file.flush().unwrap();

        let parsed = read_glossary(file.path()).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[1], GlossaryRow::new("collateral", "NA"));
    }

    #[test]
    fn test_read_glossary_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_glossary(&dir.path().join("absent.csv")).unwrap_err();
        assert!(matches!(err, IngestError::Csv { .. }));
    }
}

mod builder_tests {
    use super::*;

    #[tokio::test]
    async fn test_build_inserts_all_rows() {
        let (builder, store) = builder(MockEmbedder::new(DIM));

        let report = builder
            .build(COLLECTION, rows(&["investment", "bond", "equity"]), "glossary.csv")
            .await
            .unwrap();

        assert_eq!(
            report,
            IngestReport {
                rows: 3,
                inserted: 3,
                failed_batches: 0
            }
        );
        assert_eq!(store.record_count(COLLECTION), Some(3));
        assert!(store.is_indexed(COLLECTION));
        assert!(!store.is_loaded(COLLECTION));
    }

    #[tokio::test]
    async fn test_build_assigns_record_attributes() {
        let (builder, store) = builder(MockEmbedder::new(DIM));

        builder
            .build(
                COLLECTION,
                vec![
                    GlossaryRow::new("investment", "INVESTMENT"),
                    GlossaryRow::new("bond", "NA"),
                ],
                "data/glossary.csv",
            )
            .await
            .unwrap();

        let records = store.records(COLLECTION);
        let first = &records[0];
        assert_eq!(first.attributes.term_id, "1");
        assert_eq!(first.attributes.term_name, "investment");
        assert_eq!(first.attributes.term_category, "FINTERM");
        assert_eq!(first.attributes.term_type, "INVESTMENT");
        assert_eq!(first.attributes.definition.as_deref(), Some(""));
        assert_eq!(first.attributes.synonyms.as_deref(), Some(""));
        assert_eq!(first.input_file.as_deref(), Some("data/glossary.csv"));
        assert_eq!(first.vector, StubEmbedder::new(DIM).embed_one("investment"));
        assert_eq!(records[1].attributes.term_id, "2");
    }

    #[tokio::test]
    async fn test_build_embeds_in_batches() {
        let embedder = Arc::new(MockEmbedder::new(DIM));
        let store = Arc::new(MockCatalogStore::new());
        let builder =
            CatalogBuilder::new(Arc::clone(&embedder), Arc::clone(&store)).with_batch_size(2);

        let report = builder
            .build(COLLECTION, rows(&["a1", "b2", "c3", "d4", "e5"]), "g.csv")
            .await
            .unwrap();

        assert_eq!(report.inserted, 5);
        let calls = embedder.calls();
        assert_eq!(calls[0], DIMENSION_PROBE_TEXT);
        assert_eq!(&calls[1..], ["a1", "b2", "c3", "d4", "e5"]);
    }

    #[tokio::test]
    async fn test_failed_batch_is_skipped() {
        let embedder = MockEmbedder::new(DIM).fail_on("c3");
        let store = Arc::new(MockCatalogStore::new());
        let builder = CatalogBuilder::new(Arc::new(embedder), Arc::clone(&store)).with_batch_size(2);

        let report = builder
            .build(COLLECTION, rows(&["a1", "b2", "c3", "d4", "e5"]), "g.csv")
            .await
            .unwrap();

        assert_eq!(
            report,
            IngestReport {
                rows: 5,
                inserted: 3,
                failed_batches: 1
            }
        );
        let names: Vec<String> = store
            .records(COLLECTION)
            .into_iter()
            .map(|r| r.attributes.term_name)
            .collect();
        assert_eq!(names, ["a1", "b2", "e5"]);
    }

    #[tokio::test]
    async fn test_build_replaces_existing_collection() {
        let old = TermRecord::new(
            TermAttributes::new("99", "stale", "FINTERM", "NA"),
            vec![0.0; 4],
        );
        let store = Arc::new(MockCatalogStore::with_catalog(
            COLLECTION,
            CollectionSchema::finance_terms(4),
            vec![old],
        ));
        let builder = CatalogBuilder::new(Arc::new(MockEmbedder::new(DIM)), Arc::clone(&store));

        builder
            .build(COLLECTION, rows(&["bond"]), "g.csv")
            .await
            .unwrap();

        assert_eq!(store.record_count(COLLECTION), Some(1));
        assert_eq!(
            store.collection_dimension(COLLECTION).await.unwrap(),
            Some(DIM)
        );
    }

    #[tokio::test]
    async fn test_empty_glossary_creates_empty_collection() {
        let (builder, store) = builder(MockEmbedder::new(DIM));

        let report = builder.build(COLLECTION, Vec::new(), "g.csv").await.unwrap();

        assert_eq!(report, IngestReport::default());
        assert_eq!(store.record_count(COLLECTION), Some(0));
    }

    #[tokio::test]
    async fn test_overlong_row_rejected_before_embedding() {
        let embedder = Arc::new(MockEmbedder::new(DIM));
        let store = Arc::new(MockCatalogStore::new());
        let builder = CatalogBuilder::new(Arc::clone(&embedder), Arc::clone(&store));
        let long_name = "x".repeat(MAX_TERM_NAME_LEN + 1);

        let err = builder
            .build(COLLECTION, rows(&["bond", &long_name]), "g.csv")
            .await
            .unwrap_err();

        match err {
            IngestError::InvalidRow { row, source } => {
                assert_eq!(row, 2);
                assert!(matches!(
                    source,
                    VectorDbError::FieldTooLong {
                        field: "term_name",
                        ..
                    }
                ));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(embedder.call_count(), 0);
        assert!(!store.has_collection(COLLECTION).await.unwrap());
    }

    #[tokio::test]
    async fn test_probe_failure_aborts() {
        let (builder, store) = builder(MockEmbedder::new(DIM).fail_on(DIMENSION_PROBE_TEXT));

        let err = builder
            .build(COLLECTION, rows(&["bond"]), "g.csv")
            .await
            .unwrap_err();

        assert!(matches!(err, IngestError::Probe(_)));
        assert!(!store.has_collection(COLLECTION).await.unwrap());
    }

    #[tokio::test]
    async fn test_probe_dimension_mismatch() {
        let embedder = MockEmbedder::new(DIM).with_vector(DIMENSION_PROBE_TEXT, vec![1.0; 3]);
        let (builder, _) = builder(embedder);

        let err = builder
            .build(COLLECTION, rows(&["bond"]), "g.csv")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            IngestError::ProbeMismatch {
                declared: 8,
                actual: 3
            }
        ));
    }

    #[tokio::test]
    async fn test_build_from_csv_records_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "liquidity,BANKING").unwrap();
        writeln!(file, "solvency,").unwrap();
        file.flush().unwrap();

        let (builder, store) = builder(MockEmbedder::new(DIM));
        let report = builder.build_from_csv(COLLECTION, file.path()).await.unwrap();

        assert_eq!(report.inserted, 2);
        let records = store.records(COLLECTION);
        assert_eq!(records[1].attributes.term_type, "NA");
        assert_eq!(
            records[0].input_file.as_deref(),
            Some(file.path().display().to_string().as_str())
        );
    }

    #[test]
    fn test_zero_batch_size_clamped() {
        let (builder, _) = builder(MockEmbedder::new(DIM));
        assert_eq!(builder.with_batch_size(0).batch_size(), 1);
    }
}
