//! Embedding providers for the vector retriever.

pub mod provider;
pub mod providers;

pub use provider::{create_provider, EmbeddingProvider};
