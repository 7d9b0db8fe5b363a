//! Re-ranking service abstraction.
//!
//! A re-ranker receives a query and an ordered list of documents and returns
//! a relevance-ordered selection of `(index, relevance_score)` pairs, where
//! `index` points back into the submitted list.

use normas_core::AppResult;
use serde::{Deserialize, Serialize};

/// Re-ranking request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RerankRequest {
    pub query: String,
    pub documents: Vec<String>,
    pub top_n: usize,
}

impl RerankRequest {
    pub fn new(query: impl Into<String>, documents: Vec<String>, top_n: usize) -> Self {
        Self {
            query: query.into(),
            documents,
            top_n,
        }
    }
}

/// A relevance score assigned to one submitted document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RerankHit {
    /// 0-based position in the submitted document list
    pub index: usize,
    pub relevance_score: f64,
}

/// Trait for re-ranking providers.
#[async_trait::async_trait]
pub trait RerankClient: Send + Sync {
    fn provider_name(&self) -> &str;

    /// Return at most `top_n` hits, most relevant first.
    async fn rerank(&self, request: &RerankRequest) -> AppResult<Vec<RerankHit>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rerank_hit_fields() {
        let hit = RerankHit {
            index: 3,
            relevance_score: 0.85,
        };
        assert_eq!(hit.index, 3);
        assert!((hit.relevance_score - 0.85).abs() < f64::EPSILON);
    }
}
