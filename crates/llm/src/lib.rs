//! Generation and re-ranking services for Normas.
//!
//! Both services sit behind traits so the retrieval pipeline can be driven
//! by real HTTP providers in production and by in-process fakes in tests.
//!
//! # Providers
//! - **Ollama**: Local generation runtime (default)
//! - **OpenAI**: Any OpenAI-compatible chat completions endpoint
//! - **Cohere**: Hosted re-ranking (`rerank-multilingual-v3.0`)
//! - **none**: Re-ranker that keeps retrieval order
//!
//! # Example
//! ```no_run
//! use normas_llm::{LlmClient, LlmRequest, providers::OllamaClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OllamaClient::new();
//! let request = LlmRequest::new("Olá", "llama3.2").with_temperature(0.0);
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod rerank;
pub mod types;

pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::{create_client, create_reranker};
pub use providers::{CohereReranker, OllamaClient, OpenAiClient, PassthroughReranker};
pub use rerank::{RerankClient, RerankHit, RerankRequest};
pub use types::{ProviderType, RerankProviderType};
