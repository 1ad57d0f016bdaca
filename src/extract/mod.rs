//! Candidate term extraction.

use std::sync::LazyLock;

use regex::Regex;

use crate::constants::MIN_CANDIDATE_CHARS;


/// Runs of Latin letters with internal whitespace, hyphens and periods,
/// anchored at word boundaries on both ends.
static CANDIDATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Za-z][A-Za-z\s\-\.]*\b").expect("candidate pattern is a valid regex")
});

/// Splits free text into candidate terms.
#[derive(Debug, Clone, Copy)]
pub struct CandidateExtractor {
    min_chars: usize,
}

impl Default for CandidateExtractor {
    fn default() -> Self {
        Self {
            min_chars: MIN_CANDIDATE_CHARS,
        }
    }
}

impl CandidateExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs whose trimmed length is at or below `min_chars` are discarded.
    pub fn with_min_chars(mut self, min_chars: usize) -> Self {
        self.min_chars = min_chars;
        self
    }

    /// Returns trimmed candidates in source order, duplicates included.
    ///
    /// When no run survives, the whole input (untrimmed) is the only candidate,
    /// so `extract("")` is `[""]`.
    pub fn extract(&self, text: &str) -> Vec<String> {
        let candidates: Vec<String> = CANDIDATE_PATTERN
            .find_iter(text)
            .map(|m| m.as_str().trim())
            .filter(|c| c.chars().count() > self.min_chars)
            .map(str::to_string)
            .collect();

        if candidates.is_empty() {
            return vec![text.to_string()];
        }
        candidates
    }
}

/// [`CandidateExtractor::extract`] with default settings.
pub fn extract_candidates(text: &str) -> Vec<String> {
    CandidateExtractor::default().extract(text)
}
