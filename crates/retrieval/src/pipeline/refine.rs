//! Rewrite-and-refine retrieval.
//!
//! A search-oriented rewrite of the question drives a first fused search.
//! The documents of the best re-ranked hits are then searched again one by
//! one with scoped retrievers.

use normas_core::AppResult;
use normas_prompt::ids;
use std::sync::Arc;

use super::AnswerEngine;
use crate::filter::FragmentFilter;
use crate::fragment_set::FragmentSet;
use crate::types::Fragment;

impl AnswerEngine {
    pub(crate) async fn refine_context(&self, question: &str) -> AppResult<Vec<Arc<Fragment>>> {
        let rewritten = self.rewrite(question).await?;

        let fused = self
            .fused_search(&rewritten, self.config.search_k, None, &self.keyword)
            .await?;
        let reranked = self
            .reranker
            .rerank(question, &fused, self.config.refine.rerank_top_n)
            .await;

        let documents = distinct_documents(&reranked, self.config.refine.max_documents);
        tracing::debug!("Refining within {:?}", documents);

        let mut refined = FragmentSet::new();
        for document in &documents {
            let scoped = self
                .keyword
                .scoped(|f| &f.metadata.source_document == document);
            let filter = FragmentFilter::new().with_source_document(document.clone());
            let hits = self
                .fused_search(&rewritten, self.config.refine.search_k, Some(&filter), &scoped)
                .await?;
            refined.extend(hits);
        }

        if refined.is_empty() {
            tracing::debug!("Refinement found nothing, keeping {} re-ranked", reranked.len());
            return Ok(reranked);
        }
        Ok(refined.into_vec())
    }

    async fn rewrite(&self, question: &str) -> AppResult<String> {
        let prompt = self.prompts.render(ids::REWRITE, &[("question", question)])?;
        let rewritten = self.generator.generate(&prompt).await?;
        let rewritten = rewritten.trim().trim_matches('"').trim();
        if rewritten.is_empty() {
            return Ok(question.to_string());
        }
        tracing::info!("Search query: {}", rewritten);
        Ok(rewritten.to_string())
    }
}

/// First `max` distinct non-empty source documents, in order.
fn distinct_documents(fragments: &[Arc<Fragment>], max: usize) -> Vec<String> {
    let mut documents: Vec<String> = Vec::new();
    for source in fragments.iter().filter_map(|f| f.metadata.source()) {
        if documents.len() == max {
            break;
        }
        if !documents.iter().any(|d| d == source) {
            documents.push(source.to_string());
        }
    }
    documents
}
