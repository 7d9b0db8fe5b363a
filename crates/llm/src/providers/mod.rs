//! Concrete generation and re-ranking providers.

pub mod cohere;
pub mod ollama;
pub mod openai;
pub mod passthrough;

pub use cohere::CohereReranker;
pub use ollama::OllamaClient;
pub use openai::OpenAiClient;
pub use passthrough::PassthroughReranker;

use std::time::Duration;

/// Build an HTTP client, optionally bounded by a request timeout in seconds.
pub(crate) fn http_client(timeout_secs: Option<u64>) -> reqwest::Client {
    let mut builder = reqwest::Client::builder();
    if let Some(secs) = timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    builder.build().unwrap_or_else(|e| {
        tracing::warn!("Falling back to default HTTP client: {}", e);
        reqwest::Client::new()
    })
}
