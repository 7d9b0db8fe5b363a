//! Dense vector retrieval over precomputed fragment embeddings.

use async_trait::async_trait;
use normas_core::{AppError, AppResult};
use std::sync::Arc;

use crate::embeddings::EmbeddingProvider;
use crate::filter::FragmentFilter;
use crate::store::FragmentStore;
use crate::types::Fragment;

/// Similarity search with an optional equality filter applied before ranking.
#[async_trait]
pub trait VectorRetriever: Send + Sync {
    async fn search(
        &self,
        query: &str,
        k: usize,
        filter: Option<&FragmentFilter>,
    ) -> AppResult<Vec<Arc<Fragment>>>;
}

/// Brute-force cosine index over the whole corpus.
#[derive(Debug)]
pub struct EmbeddingIndex {
    entries: Vec<(Arc<Fragment>, Vec<f32>)>,
    provider: Arc<dyn EmbeddingProvider>,
}

impl EmbeddingIndex {
    /// Build the index, embedding the fragments that have no vector yet.
    ///
    /// `embeddings` is aligned with the store positions.
    pub async fn build(
        store: &FragmentStore,
        embeddings: Vec<Option<Vec<f32>>>,
        provider: Arc<dyn EmbeddingProvider>,
    ) -> AppResult<Self> {
        if embeddings.len() != store.len() {
            return Err(AppError::Retrieval(format!(
                "{} embeddings for {} fragments",
                embeddings.len(),
                store.len()
            )));
        }

        let missing: Vec<usize> = embeddings
            .iter()
            .enumerate()
            .filter(|(_, e)| e.is_none())
            .map(|(i, _)| i)
            .collect();

        let mut embeddings = embeddings;
        if !missing.is_empty() {
            tracing::info!(
                "Embedding {} fragments with {} ({})",
                missing.len(),
                provider.provider_name(),
                provider.model_name()
            );
            let texts: Vec<String> = missing
                .iter()
                .map(|&i| store.fragments()[i].content.clone())
                .collect();
            let computed = provider.embed_batch(&texts).await?;
            if computed.len() != missing.len() {
                return Err(AppError::Retrieval(format!(
                    "Embedding provider returned {} vectors for {} fragments",
                    computed.len(),
                    missing.len()
                )));
            }
            for (i, vector) in missing.into_iter().zip(computed) {
                embeddings[i] = Some(vector);
            }
        }

        let dimensions = provider.dimensions();
        let mut entries = Vec::with_capacity(store.len());
        for (fragment, embedding) in store.fragments().iter().zip(embeddings) {
            let embedding = embedding.unwrap_or_default();
            if embedding.len() != dimensions {
                return Err(AppError::Retrieval(format!(
                    "Fragment at position {} has {} dimensions, expected {}",
                    fragment.metadata.sequence_position.unwrap_or_default(),
                    embedding.len(),
                    dimensions
                )));
            }
            entries.push((Arc::clone(fragment), embedding));
        }

        Ok(Self { entries, provider })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl VectorRetriever for EmbeddingIndex {
    async fn search(
        &self,
        query: &str,
        k: usize,
        filter: Option<&FragmentFilter>,
    ) -> AppResult<Vec<Arc<Fragment>>> {
        if k == 0 || self.entries.is_empty() {
            return Ok(Vec::new());
        }

        let query_embedding = self.provider.embed(query).await?;

        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, (fragment, _))| filter.map_or(true, |f| f.matches(fragment)))
            .map(|(i, (_, embedding))| (i, cosine_similarity(&query_embedding, embedding)))
            .collect();

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);

        tracing::debug!(
            "Vector search returned {} fragments (filter: {:?})",
            scored.len(),
            filter
        );

        Ok(scored
            .into_iter()
            .map(|(i, _)| Arc::clone(&self.entries[i].0))
            .collect())
    }
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}
