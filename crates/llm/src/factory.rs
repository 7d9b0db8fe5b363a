//! Provider factory.
//!
//! Resolves provider names to client implementations. Secrets are resolved
//! by the caller (see `AppConfig::resolve_api_key`) and passed in.

use crate::client::LlmClient;
use crate::providers::cohere::DEFAULT_RERANK_MODEL;
use crate::providers::{CohereReranker, OllamaClient, OpenAiClient, PassthroughReranker};
use crate::rerank::RerankClient;
use crate::types::{ProviderType, RerankProviderType};
use normas_core::{AppError, AppResult};
use std::sync::Arc;

/// Create a generation client.
///
/// # Arguments
/// * `provider` - Provider identifier ("ollama", "openai")
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - API key, required by hosted providers
/// * `timeout_secs` - Optional request timeout
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
    timeout_secs: Option<u64>,
) -> AppResult<Arc<dyn LlmClient>> {
    match ProviderType::parse(provider) {
        Some(ProviderType::Ollama) => {
            let base_url = endpoint.unwrap_or("http://localhost:11434");
            Ok(Arc::new(OllamaClient::with_options(base_url, timeout_secs)))
        }
        Some(ProviderType::OpenAI) => {
            let key = api_key.ok_or_else(|| {
                AppError::Config("OpenAI provider requires API key".to_string())
            })?;
            let base_url = endpoint.unwrap_or("https://api.openai.com");
            Ok(Arc::new(OpenAiClient::with_options(
                base_url,
                key,
                timeout_secs,
            )))
        }
        None => Err(AppError::Config(format!("Unknown provider: {}", provider))),
    }
}

/// Create a re-ranking client.
///
/// `model` defaults to `rerank-multilingual-v3.0` for Cohere.
pub fn create_reranker(
    provider: &str,
    model: Option<&str>,
    endpoint: Option<&str>,
    api_key: Option<&str>,
    timeout_secs: Option<u64>,
) -> AppResult<Arc<dyn RerankClient>> {
    match RerankProviderType::parse(provider) {
        Some(RerankProviderType::Cohere) => {
            let key = api_key.ok_or_else(|| {
                AppError::Config("Cohere rerank provider requires API key".to_string())
            })?;
            Ok(Arc::new(CohereReranker::with_options(
                endpoint.unwrap_or("https://api.cohere.com"),
                key,
                model.unwrap_or(DEFAULT_RERANK_MODEL),
                timeout_secs,
            )))
        }
        Some(RerankProviderType::Passthrough) => Ok(Arc::new(PassthroughReranker)),
        None => Err(AppError::Config(format!(
            "Unknown rerank provider: {}",
            provider
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_ollama_client() {
        let client = create_client("ollama", None, None, None).unwrap();
        assert_eq!(client.provider_name(), "ollama");
    }

    #[test]
    fn test_create_ollama_with_custom_endpoint() {
        assert!(create_client("ollama", Some("http://localhost:8080"), None, Some(30)).is_ok());
    }

    #[test]
    fn test_openai_requires_api_key() {
        match create_client("openai", None, None, None) {
            Err(err) => assert!(err.to_string().contains("requires API key")),
            Ok(_) => panic!("Expected error for OpenAI without API key"),
        }
    }

    #[test]
    fn test_unknown_provider() {
        assert!(matches!(
            create_client("gguf", None, None, None),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_create_passthrough_reranker() {
        let reranker = create_reranker("none", None, None, None, None).unwrap();
        assert_eq!(reranker.provider_name(), "none");
    }

    #[test]
    fn test_cohere_requires_api_key() {
        assert!(create_reranker("cohere", None, None, None, None).is_err());
        let reranker = create_reranker("cohere", None, None, Some("key"), None).unwrap();
        assert_eq!(reranker.provider_name(), "cohere");
    }
}
