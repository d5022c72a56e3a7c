//! Client-side fuzzy matching for the live query.
//!
//! Whitespace splits the query into terms and every term must match. The
//! visible set keeps its fetch order; there is no ranking, so only the
//! boolean outcome of each match is used. Narrowing never re-fetches.

use crate::data::Row;
use nucleo::{
    pattern::{CaseMatching, Normalization, Pattern},
    Config, Matcher, Utf32Str,
};

pub struct FuzzySearch {
    matcher: Matcher,
}

impl Default for FuzzySearch {
    fn default() -> Self {
        Self::new()
    }
}

impl FuzzySearch {
    pub fn new() -> Self {
        Self {
            matcher: Matcher::new(Config::DEFAULT),
        }
    }

    fn term_matches(&mut self, term: &str, haystack: &str) -> bool {
        let pattern = Pattern::parse(term, CaseMatching::Ignore, Normalization::Smart);
        let mut buf = Vec::new();
        pattern
            .score(Utf32Str::new(haystack, &mut buf), &mut self.matcher)
            .is_some()
    }

    /// True when every whitespace-separated term of `query` matches.
    /// An empty query matches everything.
    pub fn matches(&mut self, query: &str, haystack: &str) -> bool {
        query
            .split_whitespace()
            .all(|term| self.term_matches(term, haystack))
    }

    /// Indices of the rows matching `query`, in their original fetch order.
    pub fn filter_rows(&mut self, rows: &[Row], query: &str) -> Vec<usize> {
        if query.trim().is_empty() {
            return (0..rows.len()).collect();
        }
        rows.iter()
            .enumerate()
            .filter(|(_, row)| self.matches(query, &row.display_line()))
            .map(|(i, _)| i)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_term_must_match() {
        let mut search = FuzzySearch::new();
        assert!(search.matches("tokio panic", "tokio worker panicked on shutdown"));
        assert!(!search.matches("tokio windows", "tokio worker panicked on shutdown"));
    }

    #[test]
    fn matching_is_case_insensitive() {
        let mut search = FuzzySearch::new();
        assert!(search.matches("RELEASE", "release v2.1.0 is out"));
        assert!(search.matches("release", "RELEASE V2.1.0 IS OUT"));
    }

    #[test]
    fn empty_query_matches_everything() {
        let mut search = FuzzySearch::new();
        assert!(search.matches("", "anything"));
        assert!(search.matches("   ", "anything"));
    }
}
