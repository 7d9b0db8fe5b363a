//! Re-ranker that keeps the submitted order.
//!
//! Used when no re-ranking service is configured. Scores decrease with
//! position so downstream consumers still see a meaningful ordering.

use crate::rerank::{RerankClient, RerankHit, RerankRequest};
use normas_core::AppResult;

#[derive(Debug, Default, Clone, Copy)]
pub struct PassthroughReranker;

#[async_trait::async_trait]
impl RerankClient for PassthroughReranker {
    fn provider_name(&self) -> &str {
        "none"
    }

    async fn rerank(&self, request: &RerankRequest) -> AppResult<Vec<RerankHit>> {
        let total = request.documents.len();
        Ok((0..total.min(request.top_n))
            .map(|index| RerankHit {
                index,
                relevance_score: 1.0 - index as f64 / total as f64,
            })
            .collect())
    }
}
