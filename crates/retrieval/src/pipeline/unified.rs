//! Unified pipeline: model-extracted metadata narrows the vector side of
//! the fused search; the re-ranked hits go through synthesis and the
//! formatting pass.

use normas_core::AppResult;
use std::sync::Arc;

use super::AnswerEngine;
use crate::fragment_set::FragmentSet;
use crate::query_parser::ModelExtractor;
use crate::synthesis::synthesize_and_format;
use crate::types::{ConversationTurn, RagAnswer};

impl AnswerEngine {
    pub(crate) async fn unified_answer(
        &self,
        question: &str,
        history: &[ConversationTurn],
    ) -> AppResult<RagAnswer> {
        let standalone = self.condense(question, history).await?;
        self.unified_from_standalone(&standalone).await
    }

    pub(crate) async fn unified_from_standalone(&self, question: &str) -> AppResult<RagAnswer> {
        let extractor = ModelExtractor::new(self.generator.clone(), Arc::clone(&self.prompts));
        let metadata = extractor.extract(question).await?;

        let vector_filter = metadata.to_fragment_filter();
        let vector_filter = vector_filter.has_filters().then_some(&vector_filter);

        let fused = self
            .fused_search(question, self.config.unified.search_k, vector_filter, &self.keyword)
            .await?;
        if fused.is_empty() {
            return Ok(RagAnswer::no_information());
        }

        let reranked = self
            .reranker
            .rerank(question, &fused, self.config.unified.rerank_top_n)
            .await;
        let context: FragmentSet = reranked.into_iter().collect();
        if context.is_empty() {
            return Ok(RagAnswer::no_information());
        }

        synthesize_and_format(
            &self.synthesizer,
            &self.generator,
            &self.prompts,
            question,
            context.as_slice(),
        )
        .await
    }
}
