use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_SEARCH_LIMIT;
use crate::vectordb::{TermAttributes, TermFilter, TermHit};

/// A catalog entry matched to a candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermMatch {
    #[serde(flatten)]
    pub attributes: TermAttributes,
    /// Distance from the candidate. Lower is more similar.
    pub distance: f32,
}

impl From<TermHit> for TermMatch {
    fn from(hit: TermHit) -> Self {
        Self {
            attributes: hit.attributes,
            distance: hit.distance,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolveOptions {
    /// Maximum matches per candidate.
    pub limit: usize,
    /// Restricts the search to records matching every condition.
    pub filter: Option<TermFilter>,
    /// Drops matches farther than this.
    pub max_distance: Option<f32>,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_SEARCH_LIMIT,
            filter: None,
            max_distance: None,
        }
    }
}

impl ResolveOptions {
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_filter(mut self, filter: TermFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_max_distance(mut self, max_distance: f32) -> Self {
        self.max_distance = Some(max_distance);
        self
    }
}
