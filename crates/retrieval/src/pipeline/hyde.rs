//! Hypothetical-document retrieval.
//!
//! The model writes a plausible normative passage for the question; that
//! passage drives the vector search while the question itself drives the
//! keyword search. Widening stays inside the document of the best hit.

use normas_core::AppResult;
use normas_prompt::ids;
use std::sync::Arc;

use super::AnswerEngine;
use crate::fragment_set::FragmentSet;
use crate::keyword::KeywordRetriever;
use crate::types::Fragment;
use crate::widening::{push_with_neighbours, NeighbourScope};

impl AnswerEngine {
    pub(crate) async fn hyde_context(&self, question: &str) -> AppResult<Vec<Arc<Fragment>>> {
        if let Some(direct) = self.direct_lookup(question) {
            return Ok(direct);
        }

        let prompt = self.prompts.render(ids::HYDE, &[("question", question)])?;
        let hypothetical = self.generator.generate(&prompt).await?;
        let hypothetical = match hypothetical.trim() {
            "" => question,
            text => text,
        };
        tracing::debug!("Hypothetical passage: {} chars", hypothetical.len());

        let k = self.config.search_k;
        let mut candidates = FragmentSet::new();
        candidates.extend(self.vector.search(hypothetical, k, None).await?);
        candidates.extend(self.keyword.search(question, k));
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let reranked = self
            .reranker
            .rerank(question, candidates.as_slice(), self.config.rerank_top_n)
            .await;

        let Some(primary) = reranked
            .first()
            .and_then(|f| f.metadata.source())
            .map(str::to_string)
        else {
            return Ok(reranked);
        };

        let widen_top_n = self.config.hyde.widen_top_n;
        let mut widened = FragmentSet::new();
        for fragment in reranked.iter().take(widen_top_n) {
            if fragment.metadata.source_document == primary {
                push_with_neighbours(&mut widened, fragment, &self.store, NeighbourScope::SameDocument);
            } else {
                widened.push(Arc::clone(fragment));
            }
        }
        widened.extend(reranked.iter().skip(widen_top_n).cloned());

        tracing::debug!(
            "HyDE context: {} candidates, {} re-ranked, {} widened around {}",
            candidates.len(),
            reranked.len(),
            widened.len(),
            primary
        );
        Ok(widened.into_vec())
    }
}
