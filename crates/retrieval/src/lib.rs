//! Hybrid retrieval and answer synthesis over a corpus of regulatory norms.
//!
//! A question flows through metadata parsing, an optional direct lookup,
//! keyword and vector retrieval, rank fusion, re-ranking and context
//! widening before the surviving fragments are handed to generation.
//! The strategies that combine these stages live in [`pipeline`].

pub mod corpus;
pub mod embeddings;
pub mod filter;
pub mod fragment_set;
pub mod fusion;
pub mod keyword;
pub mod pipeline;
pub mod query_parser;
pub mod rerank;
pub mod store;
pub mod synthesis;
pub mod text;
pub mod types;
pub mod vector;
pub mod widening;

#[cfg(test)]
mod tests;

pub use corpus::{load_corpus, LoadedCorpus};
pub use embeddings::{create_provider, EmbeddingProvider};
pub use filter::{FragmentFilter, MetadataFilter};
pub use fragment_set::FragmentSet;
pub use fusion::{fuse, RetrievalCandidate, RetrievalPath};
pub use keyword::{Bm25Index, KeywordRetriever};
pub use pipeline::{AnswerEngine, PipelineStrategy};
pub use query_parser::{ModelExtractor, RuleBasedParser};
pub use rerank::Reranker;
pub use store::{DocumentSummary, FragmentStore};
pub use synthesis::Generator;
pub use types::{
    ConversationTurn, Fragment, FragmentMetadata, NormType, RagAnswer, Role, SourceReference,
};
pub use vector::{EmbeddingIndex, VectorRetriever};
