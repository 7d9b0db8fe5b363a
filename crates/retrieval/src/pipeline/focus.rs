//! Retrieval restricted to documents the user selected.

use normas_core::AppResult;
use std::sync::Arc;

use super::AnswerEngine;
use crate::filter::FragmentFilter;
use crate::fragment_set::FragmentSet;
use crate::keyword::KeywordRetriever;
use crate::types::Fragment;
use crate::widening::{widen_positional, NeighbourScope};

impl AnswerEngine {
    pub(crate) async fn focus_context(
        &self,
        question: &str,
        documents: &[String],
    ) -> AppResult<Vec<Arc<Fragment>>> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }

        let k = self.config.focus.search_k;
        let scoped = self
            .keyword
            .scoped(|f| documents.contains(&f.metadata.source_document));

        let mut candidates = FragmentSet::new();
        candidates.extend(scoped.search(question, k));
        for document in documents {
            let filter = FragmentFilter::new().with_source_document(document.clone());
            candidates.extend(self.vector.search(question, k, Some(&filter)).await?);
        }
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let reranked = self
            .reranker
            .rerank(question, candidates.as_slice(), self.config.rerank_top_n)
            .await;

        let widened = widen_positional(
            &reranked,
            &self.store,
            self.config.focus.widen_top_n,
            NeighbourScope::Documents(documents),
        );
        tracing::debug!(
            "Focus context over {} documents: {} candidates, {} widened",
            documents.len(),
            candidates.len(),
            widened.len()
        );
        Ok(widened.into_vec())
    }
}
