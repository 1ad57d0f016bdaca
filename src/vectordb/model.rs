use std::fmt;

use serde::{Deserialize, Serialize};

use super::VectorDbError;
use crate::constants::{
    MAX_DEFINITION_LEN, MAX_INPUT_FILE_LEN, MAX_SYNONYMS_LEN, MAX_TERM_CATEGORY_LEN,
    MAX_TERM_ID_LEN, MAX_TERM_NAME_LEN, MAX_TERM_TYPE_LEN,
};

/// Scalar fields of a catalog record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TermField {
    TermId,
    TermName,
    TermCategory,
    TermType,
    Definition,
    Synonyms,
    InputFile,
}

impl TermField {
    pub const ALL: [TermField; 7] = [
        TermField::TermId,
        TermField::TermName,
        TermField::TermCategory,
        TermField::TermType,
        TermField::Definition,
        TermField::Synonyms,
        TermField::InputFile,
    ];

    /// Payload key used in the store.
    pub fn as_str(&self) -> &'static str {
        match self {
            TermField::TermId => "term_id",
            TermField::TermName => "term_name",
            TermField::TermCategory => "term_category",
            TermField::TermType => "term_type",
            TermField::Definition => "definition",
            TermField::Synonyms => "synonyms",
            TermField::InputFile => "input_file",
        }
    }

    /// Maximum length in characters.
    pub fn max_len(&self) -> usize {
        match self {
            TermField::TermId => MAX_TERM_ID_LEN,
            TermField::TermName => MAX_TERM_NAME_LEN,
            TermField::TermCategory => MAX_TERM_CATEGORY_LEN,
            TermField::TermType => MAX_TERM_TYPE_LEN,
            TermField::Definition => MAX_DEFINITION_LEN,
            TermField::Synonyms => MAX_SYNONYMS_LEN,
            TermField::InputFile => MAX_INPUT_FILE_LEN,
        }
    }

    /// Reads this field from a record. Absent optional fields read as `None`.
    pub fn value_of<'a>(&self, record: &'a TermRecord) -> Option<&'a str> {
        let attrs = &record.attributes;
        match self {
            TermField::TermId => Some(&attrs.term_id),
            TermField::TermName => Some(&attrs.term_name),
            TermField::TermCategory => Some(&attrs.term_category),
            TermField::TermType => Some(&attrs.term_type),
            TermField::Definition => attrs.definition.as_deref(),
            TermField::Synonyms => attrs.synonyms.as_deref(),
            TermField::InputFile => record.input_file.as_deref(),
        }
    }
}

impl fmt::Display for TermField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The six descriptive attributes returned for every match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermAttributes {
    pub term_id: String,
    pub term_name: String,
    pub term_category: String,
    pub term_type: String,
    #[serde(default)]
    pub definition: Option<String>,
    #[serde(default)]
    pub synonyms: Option<String>,
}

impl TermAttributes {
    pub fn new(term_id: &str, term_name: &str, term_category: &str, term_type: &str) -> Self {
        Self {
            term_id: term_id.to_string(),
            term_name: term_name.to_string(),
            term_category: term_category.to_string(),
            term_type: term_type.to_string(),
            definition: None,
            synonyms: None,
        }
    }

    pub fn with_definition(mut self, definition: &str) -> Self {
        self.definition = Some(definition.to_string());
        self
    }

    pub fn with_synonyms(mut self, synonyms: &str) -> Self {
        self.synonyms = Some(synonyms.to_string());
        self
    }
}

/// A canonical catalog entry with its embedding.
#[derive(Debug, Clone)]
pub struct TermRecord {
    pub attributes: TermAttributes,
    pub input_file: Option<String>,
    /// Embedding of `term_name`.
    pub vector: Vec<f32>,
}

impl TermRecord {
    pub fn new(attributes: TermAttributes, vector: Vec<f32>) -> Self {
        Self {
            attributes,
            input_file: None,
            vector,
        }
    }

    pub fn with_input_file(mut self, input_file: &str) -> Self {
        self.input_file = Some(input_file.to_string());
        self
    }
}

/// One nearest-neighbor hit.
#[derive(Debug, Clone, PartialEq)]
pub struct TermHit {
    pub attributes: TermAttributes,
    /// Lower is more similar.
    pub distance: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DistanceMetric {
    #[default]
    Cosine,
    Euclidean,
}

impl DistanceMetric {
    /// Converts a store similarity score into a lower-is-better distance.
    pub fn distance_from_score(&self, score: f32) -> f32 {
        match self {
            DistanceMetric::Cosine => 1.0 - score,
            DistanceMetric::Euclidean => score,
        }
    }

    /// Computes the distance between two vectors of equal length.
    pub fn distance(&self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            DistanceMetric::Cosine => 1.0 - cosine_similarity(a, b),
            DistanceMetric::Euclidean => a
                .iter()
                .zip(b)
                .map(|(x, y)| (x - y) * (x - y))
                .sum::<f32>()
                .sqrt(),
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistanceMetric::Cosine => f.write_str("COSINE"),
            DistanceMetric::Euclidean => f.write_str("L2"),
        }
    }
}

/// Cosine similarity; `0.0` if either vector is zero or lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let mut dot = 0.0_f32;
    let mut norm_a = 0.0_f32;
    let mut norm_b = 0.0_f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 { 0.0 } else { dot / denom }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexType {
    /// Let the store pick the index structure.
    #[default]
    Auto,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexParams {
    pub field: String,
    pub metric: DistanceMetric,
    pub index_type: IndexType,
}

impl IndexParams {
    /// Auto index over `vector` with cosine metric.
    pub fn vector_cosine() -> Self {
        Self {
            field: "vector".to_string(),
            metric: DistanceMetric::Cosine,
            index_type: IndexType::Auto,
        }
    }
}

/// Collection layout: auto-generated primary id, one fixed-dimension vector
/// and bounded string fields. Extra payload fields are allowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionSchema {
    pub dimension: usize,
    pub metric: DistanceMetric,
    pub fields: Vec<TermField>,
    pub dynamic_fields: bool,
    pub description: String,
}

impl CollectionSchema {
    /// Layout of a financial term catalog.
    pub fn finance_terms(dimension: usize) -> Self {
        Self {
            dimension,
            metric: DistanceMetric::Cosine,
            fields: TermField::ALL.to_vec(),
            dynamic_fields: true,
            description: "Financial term standardization catalog".to_string(),
        }
    }

    /// Checks vector dimension and string bounds.
    pub fn validate_record(&self, record: &TermRecord) -> Result<(), VectorDbError> {
        if record.vector.len() != self.dimension {
            return Err(VectorDbError::InvalidDimension {
                expected: self.dimension,
                actual: record.vector.len(),
            });
        }
        self.validate_fields(record)
    }

    /// Checks string bounds only (lengths in chars).
    pub fn validate_fields(&self, record: &TermRecord) -> Result<(), VectorDbError> {
        for field in &self.fields {
            if let Some(value) = field.value_of(record) {
                let actual = value.chars().count();
                if actual > field.max_len() {
                    return Err(VectorDbError::FieldTooLong {
                        field: field.as_str(),
                        max: field.max_len(),
                        actual,
                    });
                }
            }
        }

        Ok(())
    }
}

/// Conjunction of field equality conditions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TermFilter {
    conditions: Vec<(TermField, String)>,
}

impl TermFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `field == value`.
    pub fn eq(mut self, field: TermField, value: &str) -> Self {
        self.conditions.push((field, value.to_string()));
        self
    }

    pub fn conditions(&self) -> &[(TermField, String)] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Returns `true` if every condition holds for `record`.
    pub fn matches(&self, record: &TermRecord) -> bool {
        self.conditions
            .iter()
            .all(|(field, value)| field.value_of(record) == Some(value.as_str()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InsertSummary {
    pub inserted: usize,
}

/// Generates a fresh primary key.
pub fn generate_point_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
