//! Fragments, conversation turns and answers.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::text::{fold_accents, truncate_chars};

/// Answer returned whenever no fragment survives a retrieval gate.
pub const NO_INFORMATION_ANSWER: &str =
    "Com base nos documentos fornecidos, não encontrei informações para responder a essa pergunta.";

/// Answer returned by the focus strategy when no document was selected.
pub const SELECT_NORM_ANSWER: &str =
    "Por favor, selecione ao menos uma norma para realizar a busca focada.";

/// Category of a regulatory document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NormType {
    #[serde(rename = "resolucao")]
    Resolucao,
    #[serde(rename = "circular")]
    Circular,
    #[serde(rename = "carta circular")]
    CartaCircular,
    #[serde(rename = "instrucao")]
    Instrucao,
    #[serde(rename = "instrumento")]
    Instrumento,
    #[serde(rename = "voto")]
    Voto,
    #[serde(rename = "contexto")]
    Contexto,
    #[serde(rename = "norma")]
    Norma,
}

impl NormType {
    /// Parse a norm type, accepting accents, underscores and short forms.
    pub fn parse(s: &str) -> Option<Self> {
        let normalized = fold_accents(&s.trim().to_lowercase()).replace(['_', '-'], " ");
        match normalized.as_str() {
            "resolucao" | "res" => Some(Self::Resolucao),
            "circular" => Some(Self::Circular),
            "carta circular" | "c circ" | "circ" => Some(Self::CartaCircular),
            "instrucao" => Some(Self::Instrucao),
            "instrumento" => Some(Self::Instrumento),
            "voto" => Some(Self::Voto),
            "contexto" => Some(Self::Contexto),
            "norma" => Some(Self::Norma),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Resolucao => "resolucao",
            Self::Circular => "circular",
            Self::CartaCircular => "carta circular",
            Self::Instrucao => "instrucao",
            Self::Instrumento => "instrumento",
            Self::Voto => "voto",
            Self::Contexto => "contexto",
            Self::Norma => "norma",
        }
    }

    /// Display label in Portuguese.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Resolucao => "Resolução",
            Self::Circular => "Circular",
            Self::CartaCircular => "Carta Circular",
            Self::Instrucao => "Instrução",
            Self::Instrumento => "Instrumento",
            Self::Voto => "Voto",
            Self::Contexto => "Contexto",
            Self::Norma => "Norma",
        }
    }
}

impl fmt::Display for NormType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognised norm types fall back to the generic `norma`.
fn lenient_norm_type<'de, D>(deserializer: D) -> Result<Option<NormType>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw
        .filter(|s| !s.trim().is_empty())
        .map(|s| NormType::parse(&s).unwrap_or(NormType::Norma)))
}

/// Metadata attached to a fragment at ingestion time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FragmentMetadata {
    /// Origin file identifier (e.g., "Res_4958.pdf")
    #[serde(default)]
    pub source_document: String,

    #[serde(default, deserialize_with = "lenient_norm_type")]
    pub norm_type: Option<NormType>,

    #[serde(default)]
    pub norm_number: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structural_title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structural_article: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structural_paragraph: Option<String>,

    /// 0-based position in the full ordered corpus
    #[serde(default)]
    pub sequence_position: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl FragmentMetadata {
    pub fn new(source_document: impl Into<String>) -> Self {
        Self {
            source_document: source_document.into(),
            ..Default::default()
        }
    }

    pub fn with_norm(mut self, norm_type: NormType, norm_number: impl Into<String>) -> Self {
        self.norm_type = Some(norm_type);
        self.norm_number = Some(norm_number.into());
        self
    }

    pub fn with_article(mut self, article: impl Into<String>) -> Self {
        self.structural_article = Some(article.into());
        self
    }

    pub fn with_position(mut self, position: usize) -> Self {
        self.sequence_position = Some(position);
        self
    }

    /// Non-empty enclosing article header.
    pub fn article(&self) -> Option<&str> {
        self.structural_article
            .as_deref()
            .filter(|a| !a.trim().is_empty())
    }

    /// Non-empty source document identifier.
    pub fn source(&self) -> Option<&str> {
        Some(self.source_document.as_str()).filter(|s| !s.is_empty())
    }
}

/// A unit of retrievable text. Identity is the exact text content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    pub content: String,
    #[serde(default)]
    pub metadata: FragmentMetadata,
}

impl Fragment {
    pub fn new(content: impl Into<String>, metadata: FragmentMetadata) -> Self {
        Self {
            content: content.into(),
            metadata,
        }
    }
}

/// Speaker of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Final output of every strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagAnswer {
    pub answer: String,
    pub source_documents: Vec<Fragment>,
}

impl RagAnswer {
    pub fn new(answer: String, sources: &[Arc<Fragment>]) -> Self {
        Self {
            answer,
            source_documents: sources.iter().map(|f| f.as_ref().clone()).collect(),
        }
    }

    /// Fixed answer for an empty context.
    pub fn no_information() -> Self {
        Self::fixed(NO_INFORMATION_ANSWER)
    }

    /// Fixed answer for a focus request without selected documents.
    pub fn select_norm() -> Self {
        Self::fixed(SELECT_NORM_ANSWER)
    }

    fn fixed(text: &str) -> Self {
        Self {
            answer: text.to_string(),
            source_documents: Vec::new(),
        }
    }

    /// User-facing references for the source fragments.
    pub fn source_references(&self, max_snippet: usize) -> Vec<SourceReference> {
        self.source_documents
            .iter()
            .map(|f| SourceReference::from_fragment(f, max_snippet))
            .collect()
    }
}

/// Where a piece of the answer came from, for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceReference {
    pub document: String,
    /// Article header, or "-" when the fragment has none
    pub location: String,
    pub snippet: String,
}

impl SourceReference {
    pub fn from_fragment(fragment: &Fragment, max_snippet: usize) -> Self {
        Self {
            document: fragment
                .metadata
                .source()
                .unwrap_or("desconhecido")
                .to_string(),
            location: fragment
                .metadata
                .article()
                .map(|a| a.trim().to_string())
                .unwrap_or_else(|| "-".to_string()),
            snippet: truncate_chars(&fragment.content.replace('\n', " "), max_snippet),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_norm_type_parse_variants() {
        assert_eq!(NormType::parse("Resolução"), Some(NormType::Resolucao));
        assert_eq!(NormType::parse("carta_circular"), Some(NormType::CartaCircular));
        assert_eq!(NormType::parse("circular"), Some(NormType::Circular));
        assert_eq!(NormType::parse("portaria"), None);
    }

    #[test]
    fn test_metadata_deserialization_is_lenient() {
        let json = r#"{"source_document":"Port_12.pdf","norm_type":"portaria","norm_number":"12"}"#;
        let meta: FragmentMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(meta.norm_type, Some(NormType::Norma));
        assert_eq!(meta.sequence_position, None);
    }

    #[test]
    fn test_norm_type_serializes_with_space() {
        let json = serde_json::to_string(&NormType::CartaCircular).unwrap();
        assert_eq!(json, "\"carta circular\"");
    }

    #[test]
    fn test_blank_article_is_absent() {
        let meta = FragmentMetadata::new("Res_1.pdf").with_article("   ");
        assert_eq!(meta.article(), None);
    }

    #[test]
    fn test_no_information_answer() {
        let answer = RagAnswer::no_information();
        assert!(answer.answer.contains("não encontrei informações"));
        assert!(answer.source_documents.is_empty());
    }

    #[test]
    fn test_source_reference() {
        let fragment = Fragment::new(
            "Art. 12. O Patrimônio de Referência\ncompreende o capital",
            FragmentMetadata::new("Circ_3978.pdf").with_article("Art. 12"),
        );
        let reference = SourceReference::from_fragment(&fragment, 20);
        assert_eq!(reference.document, "Circ_3978.pdf");
        assert_eq!(reference.location, "Art. 12");
        assert_eq!(reference.snippet, "Art. 12. O Patrimôni...");
    }

    #[test]
    fn test_role_serialization() {
        let turn: ConversationTurn =
            serde_json::from_str(r#"{"role":"assistant","content":"ok"}"#).unwrap();
        assert_eq!(turn.role, Role::Assistant);
    }
}
