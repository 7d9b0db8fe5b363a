//! Provider identifiers.

/// Generation provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderType {
    OpenAI,
    Ollama,
}

impl ProviderType {
    /// Parse provider type from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "openai" => Some(Self::OpenAI),
            "ollama" => Some(Self::Ollama),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAI => "openai",
            Self::Ollama => "ollama",
        }
    }
}

/// Re-ranking provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RerankProviderType {
    Cohere,
    /// Keeps the submitted order and truncates to `top_n`
    Passthrough,
}

impl RerankProviderType {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "cohere" => Some(Self::Cohere),
            "none" | "passthrough" => Some(Self::Passthrough),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cohere => "cohere",
            Self::Passthrough => "none",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_type_parsing() {
        assert_eq!(ProviderType::parse("openai"), Some(ProviderType::OpenAI));
        assert_eq!(ProviderType::parse("OLLAMA"), Some(ProviderType::Ollama));
        assert_eq!(ProviderType::parse("claude"), None);
    }

    #[test]
    fn test_rerank_provider_parsing() {
        assert_eq!(
            RerankProviderType::parse("cohere"),
            Some(RerankProviderType::Cohere)
        );
        assert_eq!(
            RerankProviderType::parse("none"),
            Some(RerankProviderType::Passthrough)
        );
        assert_eq!(RerankProviderType::parse("voyage"), None);
    }
}
