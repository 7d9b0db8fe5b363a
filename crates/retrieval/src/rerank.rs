//! Re-ranker adapter.
//!
//! Wraps a [`RerankClient`] and maps its index-based hits back onto
//! fragments. A failed call is logged and treated as "nothing relevant".

use normas_llm::{RerankClient, RerankRequest};
use std::collections::HashSet;
use std::sync::Arc;

use crate::types::Fragment;

#[derive(Clone)]
pub struct Reranker {
    client: Arc<dyn RerankClient>,
}

impl Reranker {
    pub fn new(client: Arc<dyn RerankClient>) -> Self {
        Self { client }
    }

    /// Most relevant first, at most `min(top_n, candidates.len())` fragments.
    pub async fn rerank(
        &self,
        query: &str,
        candidates: &[Arc<Fragment>],
        top_n: usize,
    ) -> Vec<Arc<Fragment>> {
        if candidates.is_empty() || top_n == 0 {
            return Vec::new();
        }

        let documents: Vec<String> = candidates.iter().map(|f| f.content.clone()).collect();
        let request = RerankRequest::new(query, documents, top_n);

        let hits = match self.client.rerank(&request).await {
            Ok(hits) => hits,
            Err(e) => {
                tracing::warn!(
                    "Re-ranking with {} failed, continuing without candidates: {}",
                    self.client.provider_name(),
                    e
                );
                return Vec::new();
            }
        };

        let limit = top_n.min(candidates.len());
        let mut used = HashSet::new();
        let mut ranked = Vec::with_capacity(limit);

        for hit in hits {
            if ranked.len() == limit {
                break;
            }
            if hit.index >= candidates.len() || !used.insert(hit.index) {
                continue;
            }
            ranked.push(Arc::clone(&candidates[hit.index]));
        }

        tracing::debug!(
            "Re-ranked {} candidates down to {}",
            candidates.len(),
            ranked.len()
        );
        ranked
    }
}

impl std::fmt::Debug for Reranker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reranker")
            .field("provider", &self.client.provider_name())
            .finish()
    }
}
