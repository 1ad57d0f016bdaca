//! Whole-text standardization: extraction, concurrent resolution and
//! aggregation over a scoped catalog session.

pub mod error;
pub mod service;
pub mod session;
pub mod types;


pub use error::{StandardizeError, StandardizeResult};
pub use service::Standardizer;
pub use session::{CatalogSession, CollectionLeases};
pub use types::{
    CatalogHandle, SessionState, StandardizationReport, StandardizeOptions, StandardizedTerm,
};
