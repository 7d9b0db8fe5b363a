//! Council: several retrieval strategies run concurrently and their
//! contexts are merged before one synthesis and one formatting pass.

use futures::future::{join_all, BoxFuture};
use normas_core::AppResult;
use std::sync::Arc;
use std::time::Duration;

use super::AnswerEngine;
use crate::fragment_set::FragmentSet;
use crate::synthesis::synthesize_and_format;
use crate::types::{ConversationTurn, Fragment, RagAnswer};

type Branch<'a> = (&'static str, BoxFuture<'a, AppResult<Vec<Arc<Fragment>>>>);

impl AnswerEngine {
    pub(crate) async fn council_answer(
        &self,
        question: &str,
        history: &[ConversationTurn],
    ) -> AppResult<RagAnswer> {
        let standalone = self.condense(question, history).await?;
        let merged = self.council_context(&standalone).await;

        if merged.is_empty() {
            tracing::info!("No branch produced context");
            return Ok(RagAnswer::no_information());
        }

        synthesize_and_format(
            &self.synthesizer,
            &self.generator,
            &self.prompts,
            &standalone,
            merged.as_slice(),
        )
        .await
    }

    /// Run every branch, wait for all of them, then merge in branch order.
    /// A failed or timed-out branch contributes nothing.
    pub(crate) async fn council_context(&self, question: &str) -> FragmentSet {
        let filter = self.rules.parse(question);
        let focus_document = if filter.is_exact() {
            self.store.first_document_matching(&filter)
        } else {
            None
        };

        let mut branches: Vec<Branch<'_>> = vec![
            ("hybrid", Box::pin(self.hybrid_context(question))),
            ("refine", Box::pin(self.refine_context(question))),
            ("hyde", Box::pin(self.hyde_context(question))),
        ];
        if let Some(document) = focus_document {
            tracing::debug!("Council adds a focus branch on {}", document);
            branches.push((
                "focus",
                Box::pin(async move { self.focus_context(question, &[document]).await }),
            ));
        }

        let timeout = Duration::from_secs(self.config.branch_timeout_secs);
        let results = join_all(branches.into_iter().map(|(name, branch)| async move {
            (name, tokio::time::timeout(timeout, branch).await)
        }))
        .await;

        let mut merged = FragmentSet::new();
        for (name, result) in results {
            match result {
                Ok(Ok(fragments)) => {
                    tracing::debug!("Branch {} returned {} fragments", name, fragments.len());
                    merged.extend(fragments);
                }
                Ok(Err(e)) => {
                    tracing::warn!("Branch {} failed: {}", name, e);
                }
                Err(_) => {
                    tracing::warn!("Branch {} timed out after {:?}", name, timeout);
                }
            }
        }

        tracing::info!("Council merged {} fragments", merged.len());
        merged
    }
}
