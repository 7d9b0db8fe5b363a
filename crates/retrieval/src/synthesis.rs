//! Generation stages: condensation, context assembly, synthesis and the
//! formatting pass.
//!
//! Every stage that consumes retrieved fragments checks for an empty
//! context first and returns the fixed "no information" answer without
//! calling the model.

use normas_core::{AppError, AppResult};
use normas_llm::{LlmClient, LlmRequest};
use normas_prompt::{ids, PromptLibrary};
use std::sync::Arc;

use crate::types::{ConversationTurn, Fragment, RagAnswer};

/// Separator placed between fragments in a context block.
pub const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

/// A generation client bound to one model and temperature.
#[derive(Clone)]
pub struct Generator {
    client: Arc<dyn LlmClient>,
    model: String,
    temperature: f32,
}

impl Generator {
    pub fn new(client: Arc<dyn LlmClient>, model: impl Into<String>, temperature: f32) -> Self {
        Self {
            client,
            model: model.into(),
            temperature,
        }
    }

    /// Same client and temperature, different model.
    pub fn with_model(&self, model: impl Into<String>) -> Self {
        Self {
            client: Arc::clone(&self.client),
            model: model.into(),
            temperature: self.temperature,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Generate text for a rendered prompt.
    pub async fn generate(&self, prompt: &str) -> AppResult<String> {
        let request = LlmRequest::new(prompt, &self.model).with_temperature(self.temperature);

        tracing::debug!(
            "Calling {} with model {} ({} prompt chars)",
            self.client.provider_name(),
            self.model,
            prompt.len()
        );

        let response = self.client.complete(&request).await.map_err(|e| match e {
            AppError::Llm(_) => e,
            other => AppError::Llm(other.to_string()),
        })?;

        Ok(response.content)
    }
}

impl std::fmt::Debug for Generator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Generator")
            .field("provider", &self.client.provider_name())
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .finish()
    }
}

/// One "role: content" line per turn.
pub fn format_history(history: &[ConversationTurn]) -> String {
    history
        .iter()
        .map(|turn| format!("{}: {}", turn.role.as_str(), turn.content))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Rewrite a follow-up question into a standalone one.
///
/// An empty history returns the question unchanged without a model call.
pub async fn condense_question(
    generator: &Generator,
    prompts: &PromptLibrary,
    question: &str,
    history: &[ConversationTurn],
) -> AppResult<String> {
    if history.is_empty() {
        return Ok(question.to_string());
    }

    let chat_history = format_history(history);
    let prompt = prompts.render(
        ids::CONDENSE,
        &[("chat_history", chat_history.as_str()), ("question", question)],
    )?;

    let standalone = generator.generate(&prompt).await?;
    let standalone = standalone.trim();

    if standalone.is_empty() {
        tracing::warn!("Condensation returned nothing, keeping the original question");
        return Ok(question.to_string());
    }

    tracing::info!("Standalone question: {}", standalone);
    Ok(standalone.to_string())
}

/// Join fragment texts in discovery order.
pub fn build_context(fragments: &[Arc<Fragment>]) -> String {
    fragments
        .iter()
        .map(|f| f.content.as_str())
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}

/// Single-call answer with the question-answering template.
pub async fn answer_with_context(
    generator: &Generator,
    prompts: &PromptLibrary,
    question: &str,
    fragments: &[Arc<Fragment>],
) -> AppResult<RagAnswer> {
    if fragments.is_empty() {
        return Ok(RagAnswer::no_information());
    }

    let context = build_context(fragments);
    let prompt = prompts.render(ids::QA, &[("context", context.as_str()), ("question", question)])?;

    tracing::info!("Generating answer from {} fragments", fragments.len());
    let answer = generator.generate(&prompt).await?;
    Ok(RagAnswer::new(answer, fragments))
}

/// Two sequential calls: a raw synthesis over the whole context, then a
/// formatting pass that only restructures the synthesis output.
pub async fn synthesize_and_format(
    synthesizer: &Generator,
    formatter: &Generator,
    prompts: &PromptLibrary,
    question: &str,
    fragments: &[Arc<Fragment>],
) -> AppResult<RagAnswer> {
    if fragments.is_empty() {
        return Ok(RagAnswer::no_information());
    }

    let context = build_context(fragments);
    let synthesis_prompt = prompts.render(
        ids::SYNTHESIS,
        &[("consolidated_context", context.as_str()), ("question", question)],
    )?;

    tracing::info!(
        "Synthesizing over {} fragments with {}",
        fragments.len(),
        synthesizer.model()
    );
    let analysis = synthesizer.generate(&synthesis_prompt).await?;

    let format_prompt = prompts.render(
        ids::FORMAT,
        &[("verified_analysis", analysis.as_str()), ("question", question)],
    )?;
    let formatted = formatter.generate(&format_prompt).await?;

    Ok(RagAnswer::new(formatted, fragments))
}

/// Definition-style answer for factual questions.
pub async fn factual_answer(
    generator: &Generator,
    prompts: &PromptLibrary,
    question: &str,
    fragments: &[Arc<Fragment>],
) -> AppResult<RagAnswer> {
    if fragments.is_empty() {
        return Ok(RagAnswer::no_information());
    }

    let context = build_context(fragments);
    let prompt = prompts.render(
        ids::FACTUAL,
        &[("context", context.as_str()), ("question", question)],
    )?;
    let answer = generator.generate(&prompt).await?;
    Ok(RagAnswer::new(answer, fragments))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::FakeLlm;
    use crate::types::FragmentMetadata;

    fn fragments(texts: &[&str]) -> Vec<Arc<Fragment>> {
        texts
            .iter()
            .map(|t| Arc::new(Fragment::new(*t, FragmentMetadata::new("A.pdf"))))
            .collect()
    }

    #[test]
    fn test_format_history() {
        let history = vec![
            ConversationTurn::user("O que é PR?"),
            ConversationTurn::assistant("Patrimônio de Referência."),
        ];
        assert_eq!(
            format_history(&history),
            "user: O que é PR?\nassistant: Patrimônio de Referência."
        );
    }

    #[test]
    fn test_build_context_keeps_order() {
        let context = build_context(&fragments(&["b", "a"]));
        assert_eq!(context, "b\n\n---\n\na");
    }

    #[tokio::test]
    async fn test_condense_skips_call_without_history() {
        let llm = FakeLlm::new();
        let generator = Generator::new(llm.clone(), "m", 0.0);
        let prompts = PromptLibrary::builtin().unwrap();

        let question = "  Qual o prazo?  ";
        let standalone = condense_question(&generator, &prompts, question, &[])
            .await
            .unwrap();

        assert_eq!(standalone, question);
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_condense_uses_history() {
        let llm = FakeLlm::new().with_condensed("Qual o prazo da Resolução 4958?");
        let generator = Generator::new(llm.clone(), "m", 0.0);
        let prompts = PromptLibrary::builtin().unwrap();
        let history = vec![ConversationTurn::user("Fale da Resolução 4958")];

        let standalone = condense_question(&generator, &prompts, "E o prazo?", &history)
            .await
            .unwrap();

        assert_eq!(standalone, "Qual o prazo da Resolução 4958?");
        assert!(llm.prompts()[0].contains("user: Fale da Resolução 4958"));
    }

    #[tokio::test]
    async fn test_empty_context_never_generates() {
        let llm = FakeLlm::new();
        let generator = Generator::new(llm.clone(), "m", 0.0);
        let prompts = PromptLibrary::builtin().unwrap();

        let qa = answer_with_context(&generator, &prompts, "q", &[]).await.unwrap();
        let synth = synthesize_and_format(&generator, &generator, &prompts, "q", &[])
            .await
            .unwrap();
        let factual = factual_answer(&generator, &prompts, "q", &[]).await.unwrap();

        for answer in [qa, synth, factual] {
            assert_eq!(answer.answer, crate::types::NO_INFORMATION_ANSWER);
            assert!(answer.source_documents.is_empty());
        }
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_synthesize_then_format() {
        let llm = FakeLlm::new();
        let synthesizer = Generator::new(llm.clone(), "grande", 0.0);
        let formatter = synthesizer.with_model("pequeno");
        let prompts = PromptLibrary::builtin().unwrap();

        let answer = synthesize_and_format(
            &synthesizer,
            &formatter,
            &prompts,
            "q",
            &fragments(&["trecho um", "trecho dois"]),
        )
        .await
        .unwrap();

        let prompts_seen = llm.prompts();
        assert_eq!(prompts_seen.len(), 2);
        assert!(prompts_seen[0].contains("trecho um\n\n---\n\ntrecho dois"));
        assert!(prompts_seen[1].contains("Análise Consolidada"));
        assert_eq!(llm.models(), vec!["grande".to_string(), "pequeno".to_string()]);
        assert_eq!(answer.source_documents.len(), 2);
    }

    #[tokio::test]
    async fn test_generation_failure_propagates() {
        let llm = FakeLlm::failing();
        let generator = Generator::new(llm, "m", 0.0);
        let prompts = PromptLibrary::builtin().unwrap();

        let result = answer_with_context(&generator, &prompts, "q", &fragments(&["x"])).await;
        assert!(matches!(result, Err(AppError::Llm(_))));
    }
}
