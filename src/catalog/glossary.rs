use std::io::Read;
use std::path::Path;

use crate::constants::MISSING_CELL;

use super::error::{IngestError, IngestResult};

/// One glossary line: `term_name,term_type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlossaryRow {
    pub term_name: String,
    pub term_type: String,
}

impl GlossaryRow {
    pub fn new(term_name: &str, term_type: &str) -> Self {
        Self {
            term_name: term_name.to_string(),
            term_type: term_type.to_string(),
        }
    }
}

/// Reads a header-less glossary file.
pub fn read_glossary(path: &Path) -> IngestResult<Vec<GlossaryRow>> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|source| IngestError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
    collect_rows(reader).map_err(|source| IngestError::Csv {
        path: path.to_path_buf(),
        source,
    })
}

/// Parses glossary rows from any reader. Empty or missing cells become `"NA"`.
pub fn parse_glossary<R: Read>(input: R) -> Result<Vec<GlossaryRow>, csv::Error> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(input);
    collect_rows(reader)
}

fn collect_rows<R: Read>(mut reader: csv::Reader<R>) -> Result<Vec<GlossaryRow>, csv::Error> {
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(GlossaryRow {
            term_name: cell(&record, 0),
            term_type: cell(&record, 1),
        });
    }
    Ok(rows)
}

fn cell(record: &csv::StringRecord, idx: usize) -> String {
    match record.get(idx) {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => MISSING_CELL.to_string(),
    }
}
