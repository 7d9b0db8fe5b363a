//! Answer rendering shared by `ask` and `chat`.

use normas_core::{AppError, AppResult};
use normas_retrieval::RagAnswer;

/// Shown instead of an answer when the pipeline fails.
pub const FAILURE_MESSAGE: &str = "Ocorreu um erro ao gerar a resposta.";

/// Answer text followed by a numbered list of its sources.
pub fn render_answer(answer: &RagAnswer, max_snippet: usize) -> String {
    let mut out = answer.answer.trim().to_string();

    let references = answer.source_references(max_snippet);
    if !references.is_empty() {
        out.push_str("\n\nFontes:");
        for (i, reference) in references.iter().enumerate() {
            out.push_str(&format!(
                "\n[{}] {} ({})\n    {}",
                i + 1,
                reference.document,
                reference.location,
                reference.snippet
            ));
        }
    }

    out
}

pub fn answer_json(answer: &RagAnswer) -> AppResult<String> {
    serde_json::to_string_pretty(answer).map_err(|e| AppError::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use normas_retrieval::{Fragment, FragmentMetadata, NormType};
    use std::sync::Arc;

    fn answer() -> RagAnswer {
        let fragment = Fragment::new(
            "Art. 12. As instituições devem implementar\nprocedimentos.",
            FragmentMetadata::new("Circ_3978.pdf")
                .with_norm(NormType::Circular, "3978")
                .with_article("Art. 12"),
        );
        RagAnswer::new("  Resposta.\n".to_string(), &[Arc::new(fragment)])
    }

    #[test]
    fn test_render_lists_sources() {
        let rendered = render_answer(&answer(), 200);
        assert!(rendered.starts_with("Resposta.\n\nFontes:"));
        assert!(rendered.contains("[1] Circ_3978.pdf (Art. 12)"));
        assert!(rendered.contains("implementar procedimentos."));
    }

    #[test]
    fn test_render_without_sources() {
        assert_eq!(render_answer(&RagAnswer::no_information(), 200), RagAnswer::no_information().answer);
    }

    #[test]
    fn test_answer_json_shape() {
        let json: serde_json::Value = serde_json::from_str(&answer_json(&answer()).unwrap()).unwrap();
        assert_eq!(json["answer"], "  Resposta.\n");
        assert_eq!(json["source_documents"][0]["metadata"]["source_document"], "Circ_3978.pdf");
    }
}
