//! Hybrid retrieval: direct lookup, or fused search, re-ranking and
//! article widening.

use normas_core::AppResult;
use std::sync::Arc;

use super::AnswerEngine;
use crate::types::Fragment;
use crate::widening::widen_structural;

impl AnswerEngine {
    pub(crate) async fn hybrid_context(&self, question: &str) -> AppResult<Vec<Arc<Fragment>>> {
        if let Some(direct) = self.direct_lookup(question) {
            return Ok(direct);
        }

        let fused = self
            .fused_search(question, self.config.search_k, None, &self.keyword)
            .await?;
        if fused.is_empty() {
            tracing::info!("Fused search found nothing");
            return Ok(Vec::new());
        }

        let reranked = self
            .reranker
            .rerank(question, &fused, self.config.rerank_top_n)
            .await;

        let widened = widen_structural(&reranked, &self.store, self.config.widen_top_n);
        tracing::debug!(
            "Hybrid context: {} fused, {} re-ranked, {} widened",
            fused.len(),
            reranked.len(),
            widened.len()
        );
        Ok(widened.into_vec())
    }
}
