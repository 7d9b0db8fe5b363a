//! Answer pipelines.
//!
//! [`AnswerEngine`] owns the read-only corpus, both retrievers, the
//! re-ranker and the generators. Each [`PipelineStrategy`] is one way of
//! combining them; `answer` dispatches on the strategy once.
//!
//! Retrieval for each strategy lives in its own module as a `*_context`
//! method so the council strategy can run several of them side by side.

mod council;
mod focus;
mod hybrid;
mod hyde;
mod refine;
mod router;
mod unified;

use normas_core::{AppError, AppResult, PipelineConfig};
use normas_prompt::PromptLibrary;
use std::fmt;
use std::sync::Arc;
use tracing::Instrument;

use crate::filter::FragmentFilter;
use crate::fusion::{fragments_of, fuse_with, RankedList, RetrievalPath};
use crate::keyword::{Bm25Index, KeywordRetriever};
use crate::query_parser::RuleBasedParser;
use crate::rerank::Reranker;
use crate::store::FragmentStore;
use crate::synthesis::{answer_with_context, condense_question, Generator};
use crate::types::{ConversationTurn, Fragment, RagAnswer};
use crate::vector::VectorRetriever;
use crate::widening::widen_structural;

/// The available answer strategies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineStrategy {
    /// Keyword + vector fusion, re-ranking, article widening.
    Hybrid,
    /// Vector search on a generated hypothetical passage.
    Hyde,
    /// Query rewrite followed by per-document refinement.
    Refine,
    /// Search restricted to user-selected documents.
    Focus { documents: Vec<String> },
    /// Several retrieval strategies at once, merged before synthesis.
    Council,
    /// Model-extracted metadata filter, synthesis and formatting.
    Unified,
    /// Intent classification between factual and normative questions.
    Routed,
}

impl PipelineStrategy {
    pub const NAMES: &'static [&'static str] = &[
        "hybrid", "hyde", "refine", "focus", "council", "unified", "routed",
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Hybrid => "hybrid",
            Self::Hyde => "hyde",
            Self::Refine => "refine",
            Self::Focus { .. } => "focus",
            Self::Council => "council",
            Self::Unified => "unified",
            Self::Routed => "routed",
        }
    }

    /// Parse a strategy name. `documents` is only used by `focus`.
    pub fn parse(name: &str, documents: Vec<String>) -> AppResult<Self> {
        match name.trim().to_lowercase().as_str() {
            "hybrid" => Ok(Self::Hybrid),
            "hyde" => Ok(Self::Hyde),
            "refine" => Ok(Self::Refine),
            "focus" => Ok(Self::Focus { documents }),
            "council" => Ok(Self::Council),
            "unified" => Ok(Self::Unified),
            "routed" => Ok(Self::Routed),
            other => Err(AppError::Config(format!(
                "Unknown engine '{}'. Available engines: {}",
                other,
                Self::NAMES.join(", ")
            ))),
        }
    }
}

impl fmt::Display for PipelineStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Question answering over a loaded corpus.
pub struct AnswerEngine {
    store: Arc<FragmentStore>,
    keyword: Arc<Bm25Index>,
    vector: Arc<dyn VectorRetriever>,
    reranker: Reranker,
    generator: Generator,
    synthesizer: Generator,
    prompts: Arc<PromptLibrary>,
    config: PipelineConfig,
    rules: RuleBasedParser,
}

impl AnswerEngine {
    /// The synthesis stage uses `config.synthesis_model` when set.
    pub fn new(
        store: Arc<FragmentStore>,
        keyword: Arc<Bm25Index>,
        vector: Arc<dyn VectorRetriever>,
        reranker: Reranker,
        generator: Generator,
        prompts: Arc<PromptLibrary>,
        config: PipelineConfig,
    ) -> Self {
        let synthesizer = match &config.synthesis_model {
            Some(model) => generator.with_model(model.clone()),
            None => generator.clone(),
        };

        Self {
            store,
            keyword,
            vector,
            reranker,
            generator,
            synthesizer,
            prompts,
            config,
            rules: RuleBasedParser::new(),
        }
    }

    pub fn store(&self) -> &FragmentStore {
        &self.store
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Answer a question with the given strategy.
    ///
    /// Empty retrieval is answered with the fixed "no information" text.
    /// Generation and retrieval service failures are returned as errors.
    pub async fn answer(
        &self,
        strategy: &PipelineStrategy,
        question: &str,
        history: &[ConversationTurn],
    ) -> AppResult<RagAnswer> {
        let span = tracing::info_span!("answer", strategy = strategy.name());

        async move {
            tracing::info!("Answering: {}", question);
            let answer = match strategy {
                PipelineStrategy::Hybrid => {
                    let standalone = self.condense(question, history).await?;
                    let context = self.hybrid_context(&standalone).await?;
                    self.answer_from(&standalone, &context).await
                }
                PipelineStrategy::Hyde => {
                    let standalone = self.condense(question, history).await?;
                    let context = self.hyde_context(&standalone).await?;
                    self.answer_from(&standalone, &context).await
                }
                PipelineStrategy::Refine => {
                    let standalone = self.condense(question, history).await?;
                    let context = self.refine_context(&standalone).await?;
                    self.answer_from(&standalone, &context).await
                }
                PipelineStrategy::Focus { documents } => {
                    if documents.is_empty() {
                        return Ok(RagAnswer::select_norm());
                    }
                    let standalone = self.condense(question, history).await?;
                    let context = self.focus_context(&standalone, documents).await?;
                    self.answer_from(&standalone, &context).await
                }
                PipelineStrategy::Council => self.council_answer(question, history).await,
                PipelineStrategy::Unified => self.unified_answer(question, history).await,
                PipelineStrategy::Routed => self.routed_answer(question, history).await,
            }?;
            tracing::info!(
                "Answer ready with {} source fragments",
                answer.source_documents.len()
            );
            Ok(answer)
        }
        .instrument(span)
        .await
    }

    async fn condense(&self, question: &str, history: &[ConversationTurn]) -> AppResult<String> {
        condense_question(&self.generator, &self.prompts, question, history).await
    }

    async fn answer_from(&self, question: &str, context: &[Arc<Fragment>]) -> AppResult<RagAnswer> {
        answer_with_context(&self.generator, &self.prompts, question, context).await
    }

    /// All fragments of the norm named in the question, widened to whole
    /// articles. `None` when the question names no exact norm or the corpus
    /// has none of its fragments.
    fn direct_lookup(&self, question: &str) -> Option<Vec<Arc<Fragment>>> {
        let filter = self.rules.parse(question);
        if !filter.is_exact() {
            return None;
        }

        let hits = self.store.lookup(&filter);
        if hits.is_empty() {
            tracing::debug!("No fragments for {:?}, falling back to search", filter);
            return None;
        }

        tracing::info!(
            "Direct lookup matched {} fragments of {} {}",
            hits.len(),
            filter.norm_type.map(|t| t.label()).unwrap_or_default(),
            filter.norm_number.as_deref().unwrap_or_default()
        );
        Some(widen_structural(&hits, &self.store, hits.len()).into_vec())
    }

    /// Keyword and vector search for the same query, fused by weighted rank.
    async fn fused_search(
        &self,
        query: &str,
        k: usize,
        vector_filter: Option<&FragmentFilter>,
        keyword: &Bm25Index,
    ) -> AppResult<Vec<Arc<Fragment>>> {
        let keyword_hits = keyword.search(query, k);
        let vector_hits = self.vector.search(query, k, vector_filter).await?;

        tracing::debug!(
            "Fusing {} keyword and {} vector hits",
            keyword_hits.len(),
            vector_hits.len()
        );

        let fused = fuse_with(
            vec![
                RankedList::new(RetrievalPath::Keyword, self.config.keyword_weight, keyword_hits),
                RankedList::new(RetrievalPath::Vector, self.config.vector_weight, vector_hits),
            ],
            self.config.rrf_c,
        );
        Ok(fragments_of(fused))
    }
}

impl fmt::Debug for AnswerEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnswerEngine")
            .field("fragments", &self.store.len())
            .field("generator", &self.generator)
            .field("reranker", &self.reranker)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_parse() {
        assert_eq!(
            PipelineStrategy::parse("Hybrid", vec![]).unwrap(),
            PipelineStrategy::Hybrid
        );
        assert_eq!(
            PipelineStrategy::parse("focus", vec!["A.pdf".to_string()]).unwrap(),
            PipelineStrategy::Focus {
                documents: vec!["A.pdf".to_string()]
            }
        );
        assert!(PipelineStrategy::parse("ensemble", vec![]).is_err());
    }

    #[test]
    fn test_strategy_names_round_trip() {
        for name in PipelineStrategy::NAMES {
            assert_eq!(PipelineStrategy::parse(name, vec![]).unwrap().name(), *name);
        }
    }
}
