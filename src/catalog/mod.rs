//! Catalog build job: glossary CSV to an indexed catalog collection.
//!
//! Used by the `finstd-build-catalog` binary.

mod builder;
mod error;
mod glossary;

#[cfg(test)]
mod tests;

pub use builder::{CatalogBuilder, IngestReport};
pub use error::{IngestError, IngestResult};
pub use glossary::{GlossaryRow, parse_glossary, read_glossary};
