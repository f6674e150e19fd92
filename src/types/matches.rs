//! Retrieval results returned by the vector index

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Upper bound on matches carried through the pipeline
pub const MAX_MATCHES: usize = 10;

/// One log entry retrieved from the index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: String,
    pub score: f32,
    /// Producer-specific metadata; key names vary between log shippers
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl Match {
    pub fn new(id: impl Into<String>, score: f32) -> Self {
        Self {
            id: id.into(),
            score,
            metadata: BTreeMap::new(),
        }
    }

    /// Builder-style metadata insertion
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Ordered matches, highest post-rerank score first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RetrievalResult {
    matches: Vec<Match>,
}

impl RetrievalResult {
    /// Wrap matches that are already in final order
    pub fn new(matches: Vec<Match>) -> Self {
        Self { matches }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Order by score descending and keep at most `limit` matches
    ///
    /// The sort is stable, so equal scores keep the order the index sent.
    pub fn ranked(mut matches: Vec<Match>, limit: usize) -> Self {
        matches.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        matches.truncate(limit);
        Self { matches }
    }

    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Match> {
        self.matches.iter()
    }

    /// Match ids in order
    pub fn ids(&self) -> Vec<&str> {
        self.matches.iter().map(|m| m.id.as_str()).collect()
    }
}

impl<'a> IntoIterator for &'a RetrievalResult {
    type Item = &'a Match;
    type IntoIter = std::slice::Iter<'a, Match>;

    fn into_iter(self) -> Self::IntoIter {
        self.matches.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranked_sorts_descending() {
        let result = RetrievalResult::ranked(
            vec![
                Match::new("a", 0.2),
                Match::new("b", 0.9),
                Match::new("c", 0.5),
            ],
            MAX_MATCHES,
        );
        assert_eq!(result.ids(), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_ranked_is_stable_and_truncates() {
        let result = RetrievalResult::ranked(
            vec![
                Match::new("first", 0.5),
                Match::new("second", 0.5),
                Match::new("third", 0.1),
            ],
            2,
        );
        assert_eq!(result.ids(), vec!["first", "second"]);
    }

    #[test]
    fn test_new_preserves_order() {
        let result = RetrievalResult::new(vec![Match::new("x", 0.1), Match::new("y", 0.9)]);
        assert_eq!(result.ids(), vec!["x", "y"]);
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_empty_result() {
        let result = RetrievalResult::empty();
        assert!(result.is_empty());
        assert_eq!(result.iter().count(), 0);
    }

    #[test]
    fn test_match_builder() {
        let m = Match::new("log-1", 0.7).with_field("svc", "payments");
        assert_eq!(m.metadata.get("svc").map(String::as_str), Some("payments"));
    }
}
