//! Candidate-to-catalog resolution.
//!
//! Embeds one candidate, runs a nearest-neighbor search and returns matches
//! sorted by ascending distance.

pub mod error;
pub mod resolver;
pub mod types;


pub use error::{ResolveError, ResolveResult};
pub use resolver::TermResolver;
pub use types::{ResolveOptions, TermMatch};
