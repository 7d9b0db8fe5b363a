//! Metadata extraction from free-text questions.
//!
//! Two parsers produce a [`MetadataFilter`]: an ordered list of patterns
//! over the normalised question, and a model-driven extractor that asks for
//! a small JSON object.

use normas_core::AppResult;
use normas_prompt::{ids, PromptLibrary};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::sync::Arc;

use crate::filter::MetadataFilter;
use crate::synthesis::Generator;
use crate::text::normalize_for_matching;
use crate::types::NormType;

static CARTA_CIRCULAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:carta circular|c_circ|circ)\s*n?[º°]?\s*(\d+)").unwrap()
});

static CIRCULAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bcircular\s*n?[º°]?\s*(\d+)").unwrap());

static RESOLUCAO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:resolucao|res)\s*n?[º°]?\s*(\d+)").unwrap());

static ARTICLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bart(?:igo)?\.?\s*(\d+)").unwrap());

/// Pattern rules tried in order; the first match wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedParser;

impl RuleBasedParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(&self, question: &str) -> MetadataFilter {
        let text = normalize_for_matching(question);

        let norm = Self::match_carta_circular(&text)
            .map(|n| (NormType::CartaCircular, n))
            .or_else(|| Self::match_circular(&text).map(|n| (NormType::Circular, n)))
            .or_else(|| Self::match_resolucao(&text).map(|n| (NormType::Resolucao, n)));

        let mut filter = MetadataFilter::new();
        if let Some((norm_type, number)) = norm {
            filter = filter.with_norm(norm_type, number);
            filter.article = ARTICLE.captures(&text).map(|c| c[1].to_string());
            tracing::debug!(
                "Rule parser matched {} {}",
                norm_type,
                filter.norm_number.as_deref().unwrap_or_default()
            );
        }
        filter
    }

    fn match_carta_circular(text: &str) -> Option<String> {
        CARTA_CIRCULAR.captures(text).map(|c| c[1].to_string())
    }

    /// A "circular" match is rejected when "carta" follows it on the same line.
    fn match_circular(text: &str) -> Option<String> {
        CIRCULAR.captures_iter(text).find_map(|caps| {
            let whole = caps.get(0)?;
            let rest = &text[whole.end()..];
            let line_rest = rest.lines().next().unwrap_or_default();
            if line_rest.contains("carta") {
                None
            } else {
                Some(caps[1].to_string())
            }
        })
    }

    fn match_resolucao(text: &str) -> Option<String> {
        RESOLUCAO.captures(text).map(|c| c[1].to_string())
    }
}

/// Model-driven extraction through the `rag.extract_metadata` prompt.
#[derive(Debug, Clone)]
pub struct ModelExtractor {
    generator: Generator,
    prompts: Arc<PromptLibrary>,
}

impl ModelExtractor {
    pub fn new(generator: Generator, prompts: Arc<PromptLibrary>) -> Self {
        Self { generator, prompts }
    }

    /// Malformed model output and a failed extraction call both yield an
    /// empty filter. Only a prompt rendering error is returned.
    pub async fn extract(&self, question: &str) -> AppResult<MetadataFilter> {
        let prompt = self
            .prompts
            .render(ids::EXTRACT_METADATA, &[("question", question)])?;
        let raw = match self.generator.generate(&prompt).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Metadata extraction failed, searching without filter: {}", e);
                return Ok(MetadataFilter::new());
            }
        };
        let filter = parse_extraction(&raw);
        tracing::info!("Extracted metadata: {:?}", filter);
        Ok(filter)
    }
}

/// Parse the extractor's JSON object, tolerating code fences and prose
/// around it. Falsy values are dropped.
pub fn parse_extraction(raw: &str) -> MetadataFilter {
    let Some(object) = json_object_slice(raw) else {
        tracing::warn!("Metadata extraction returned no JSON object: {}", raw.trim());
        return MetadataFilter::new();
    };

    let value: Value = match serde_json::from_str(object) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("Malformed metadata extraction output ({}): {}", e, raw.trim());
            return MetadataFilter::new();
        }
    };

    let Value::Object(map) = value else {
        tracing::warn!("Metadata extraction output is not an object");
        return MetadataFilter::new();
    };

    let field = |key: &str| map.get(key).and_then(truthy_string);

    MetadataFilter {
        norm_type: field("tipo_norma").map(|t| NormType::parse(&t).unwrap_or(NormType::Norma)),
        norm_number: field("numero_norma").map(|n| n.replace('.', "")),
        topic: field("termo_tecnico"),
        article: field("artigo"),
    }
}

/// Slice from the first `{` to the last `}`, which also drops code fences.
fn json_object_slice(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    (start < end).then(|| &trimmed[start..=end])
}

fn truthy_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(q: &str) -> MetadataFilter {
        RuleBasedParser::new().parse(q)
    }

    #[test]
    fn test_resolucao_with_accent_and_separator() {
        let filter = parse("O que diz a Resolução nº 4.958 sobre capital?");
        assert_eq!(filter.norm_type, Some(NormType::Resolucao));
        assert_eq!(filter.norm_number.as_deref(), Some("4958"));
    }

    #[test]
    fn test_carta_circular_wins_over_circular() {
        let filter = parse("Explique a carta circular 4012");
        assert_eq!(filter.norm_type, Some(NormType::CartaCircular));
        assert_eq!(filter.norm_number.as_deref(), Some("4012"));
    }

    #[test]
    fn test_circular_with_article() {
        let filter = parse("Qual a regra do Art. 12 da circular 3978?");
        assert_eq!(filter.norm_type, Some(NormType::Circular));
        assert_eq!(filter.norm_number.as_deref(), Some("3978"));
        assert_eq!(filter.article.as_deref(), Some("12"));
    }

    #[test]
    fn test_circular_followed_by_carta_is_rejected() {
        assert!(parse("circular 3978 e a carta").is_empty());
        assert!(RuleBasedParser::match_circular("circular 3978 e a carta").is_none());
        assert_eq!(
            RuleBasedParser::match_circular("circular 3978\ncarta").as_deref(),
            Some("3978")
        );
    }

    #[test]
    fn test_no_match_is_empty() {
        assert!(parse("Olá, tudo bem?").is_empty());
        assert!(parse("O que é risco de crédito?").is_empty());
    }

    #[test]
    fn test_short_forms_need_word_start() {
        assert!(parse("Qual o limite para valores 1000 reais?").is_empty());
        assert_eq!(
            parse("Qual o prazo da circ 3978?").norm_type,
            Some(NormType::CartaCircular)
        );
        let filter = parse("Veja a res 4958");
        assert_eq!(filter.norm_type, Some(NormType::Resolucao));
        assert_eq!(filter.norm_number.as_deref(), Some("4958"));
    }

    #[test]
    fn test_parse_extraction_with_code_fence() {
        let raw = "```json\n{\"tipo_norma\": \"resolucao\", \"numero_norma\": \"4.958\", \"termo_tecnico\": \"risco de crédito\"}\n```";
        let filter = parse_extraction(raw);
        assert_eq!(filter.norm_type, Some(NormType::Resolucao));
        assert_eq!(filter.norm_number.as_deref(), Some("4958"));
        assert_eq!(filter.topic.as_deref(), Some("risco de crédito"));
        assert_eq!(filter.article, None);
    }

    #[test]
    fn test_parse_extraction_drops_falsy_values() {
        let raw = r#"{"tipo_norma": "", "numero_norma": null, "termo_tecnico": "PLD", "artigo": 0}"#;
        let filter = parse_extraction(raw);
        assert_eq!(filter.norm_type, None);
        assert_eq!(filter.norm_number, None);
        assert_eq!(filter.article, None);
        assert_eq!(filter.topic.as_deref(), Some("PLD"));
    }

    #[test]
    fn test_parse_extraction_numeric_article() {
        let filter = parse_extraction(r#"{"artigo": 15}"#);
        assert_eq!(filter.article.as_deref(), Some("15"));
    }

    #[test]
    fn test_malformed_extraction_is_empty() {
        assert!(parse_extraction("não sei").is_empty());
        assert!(parse_extraction("{tipo_norma: resolucao").is_empty());
        assert!(parse_extraction("{\"tipo_norma\": }").is_empty());
        assert!(parse_extraction("{}").is_empty());
    }
}
