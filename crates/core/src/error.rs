//! Error types for Normas.
//!
//! A single enum covers every failure category that can leave a crate:
//! configuration, I/O, generation and re-ranking services, retrieval,
//! prompts and serialization.

use thiserror::Error;

/// Unified error type for Normas.
///
/// Empty retrieval results are not errors; they are answered with the
/// fixed "no information" text. Only failures that cannot be absorbed at
/// a stage boundary end up here.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generation service errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Re-ranking service errors
    #[error("Rerank error: {0}")]
    Rerank(String),

    /// Corpus, index and retrieval errors
    #[error("Retrieval error: {0}")]
    Retrieval(String),

    /// Prompt system errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
