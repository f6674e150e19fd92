// Retrieval engine: two-stage similarity query against the log index
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::RetrievalError;
use crate::types::{RetrievalResult, MAX_MATCHES};

/// Second-pass rerank request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RerankSpec {
    /// Hosted rerank model name
    pub model: String,
    /// Matches kept after rerank
    pub top_n: usize,
    /// Record fields the reranker reads
    pub rank_fields: Vec<String>,
}

impl Default for RerankSpec {
    fn default() -> Self {
        Self {
            model: "bge-reranker-v2-m3".to_string(),
            top_n: MAX_MATCHES,
            rank_fields: vec!["text".to_string()],
        }
    }
}

/// Parameters for one index query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParams {
    /// Breadth of the nearest-neighbour stage
    pub top_k: usize,
    /// Optional rerank stage
    pub rerank: Option<RerankSpec>,
}

impl QueryParams {
    /// Number of matches the query can return at most
    pub fn result_limit(&self) -> usize {
        let breadth = match &self.rerank {
            Some(rerank) => rerank.top_n.min(self.top_k),
            None => self.top_k,
        };
        breadth.min(MAX_MATCHES)
    }
}

impl Default for QueryParams {
    fn default() -> Self {
        Self {
            top_k: MAX_MATCHES,
            rerank: Some(RerankSpec::default()),
        }
    }
}

/// Similarity search over the log index
///
/// Implementations return matches sorted descending by final score,
/// never more than [`MAX_MATCHES`]. Zero matches is a successful result.
/// No implementation retries; callers layer their own policy.
#[async_trait]
pub trait VectorStore: Send + Sync {
    async fn query(&self, text: &str) -> Result<RetrievalResult, RetrievalError>;
}

#[async_trait]
impl<T: VectorStore + ?Sized> VectorStore for std::sync::Arc<T> {
    async fn query(&self, text: &str) -> Result<RetrievalResult, RetrievalError> {
        (**self).query(text).await
    }
}
