//! Intent routing between factual and normative questions.

use normas_core::AppResult;
use normas_prompt::ids;

use super::AnswerEngine;
use crate::synthesis::factual_answer;
use crate::types::{ConversationTurn, RagAnswer};

const FACTUAL_LABEL: &str = "consulta factual";

impl AnswerEngine {
    pub(crate) async fn routed_answer(
        &self,
        question: &str,
        history: &[ConversationTurn],
    ) -> AppResult<RagAnswer> {
        let standalone = self.condense(question, history).await?;

        let prompt = self.prompts.render(ids::ROUTE, &[("question", standalone.as_str())])?;
        let label = self.generator.generate(&prompt).await?;
        tracing::info!("Question classified as '{}'", label.trim());

        if is_factual(&label) {
            let hits = self
                .vector
                .search(&standalone, self.config.factual_k, None)
                .await?;
            return factual_answer(&self.generator, &self.prompts, &standalone, &hits).await;
        }

        self.unified_from_standalone(&standalone).await
    }
}

/// Anything other than the factual label is treated as normative.
fn is_factual(label: &str) -> bool {
    let label = label
        .trim()
        .trim_matches(|c| c == '"' || c == '\'' || c == '.')
        .trim();
    label.to_lowercase() == FACTUAL_LABEL
}
