//! In-memory BM25 keyword retrieval.
//!
//! Terms are unicode words, lowercased with diacritics folded. Scoring uses
//! `k1 = 1.5`, `b = 0.75` and the non-negative idf
//! `ln(1 + (N - n + 0.5) / (n + 0.5))`. Documents scoring zero are not
//! returned and ties keep corpus order.

use std::collections::HashMap;
use std::sync::Arc;

use crate::text::tokenize;
use crate::types::Fragment;

const K1: f64 = 1.5;
const B: f64 = 0.75;

/// Lexical search over a fixed fragment collection.
pub trait KeywordRetriever: Send + Sync {
    /// Up to `k` fragments, best first.
    fn search(&self, query: &str, k: usize) -> Vec<Arc<Fragment>>;
}

#[derive(Debug, Clone)]
struct IndexedDoc {
    fragment: Arc<Fragment>,
    term_freqs: HashMap<String, u32>,
    length: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Bm25Index {
    docs: Vec<IndexedDoc>,
    doc_freqs: HashMap<String, usize>,
    avg_length: f64,
}

impl Bm25Index {
    pub fn build(fragments: &[Arc<Fragment>]) -> Self {
        let mut docs = Vec::with_capacity(fragments.len());
        let mut doc_freqs: HashMap<String, usize> = HashMap::new();
        let mut total_length = 0usize;

        for fragment in fragments {
            let tokens = tokenize(&fragment.content);
            let mut term_freqs: HashMap<String, u32> = HashMap::new();
            for token in &tokens {
                *term_freqs.entry(token.clone()).or_default() += 1;
            }
            for term in term_freqs.keys() {
                *doc_freqs.entry(term.clone()).or_default() += 1;
            }
            total_length += tokens.len();
            docs.push(IndexedDoc {
                fragment: Arc::clone(fragment),
                term_freqs,
                length: tokens.len(),
            });
        }

        let avg_length = if docs.is_empty() {
            0.0
        } else {
            total_length as f64 / docs.len() as f64
        };

        Self {
            docs,
            doc_freqs,
            avg_length,
        }
    }

    /// Sub-index over the fragments matching `predicate`, with idf
    /// recomputed over that subset.
    pub fn scoped<P>(&self, predicate: P) -> Self
    where
        P: Fn(&Fragment) -> bool,
    {
        let subset: Vec<Arc<Fragment>> = self
            .docs
            .iter()
            .filter(|d| predicate(&d.fragment))
            .map(|d| Arc::clone(&d.fragment))
            .collect();
        Self::build(&subset)
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    fn idf(&self, term: &str) -> f64 {
        let n = self.doc_freqs.get(term).copied().unwrap_or(0) as f64;
        let total = self.docs.len() as f64;
        (1.0 + (total - n + 0.5) / (n + 0.5)).ln()
    }

    fn score(&self, doc: &IndexedDoc, query_terms: &[(String, f64)]) -> f64 {
        let length_norm = if self.avg_length > 0.0 {
            doc.length as f64 / self.avg_length
        } else {
            0.0
        };

        query_terms
            .iter()
            .map(|(term, idf)| {
                let tf = doc.term_freqs.get(term).copied().unwrap_or(0) as f64;
                if tf == 0.0 {
                    return 0.0;
                }
                idf * (tf * (K1 + 1.0)) / (tf + K1 * (1.0 - B + B * length_norm))
            })
            .sum()
    }

    /// Scored search, exposed for diagnostics and tests.
    pub fn search_scored(&self, query: &str, k: usize) -> Vec<(Arc<Fragment>, f64)> {
        if k == 0 || self.docs.is_empty() {
            return Vec::new();
        }

        let mut terms = tokenize(query);
        terms.sort();
        terms.dedup();
        let query_terms: Vec<(String, f64)> = terms
            .into_iter()
            .filter(|t| self.doc_freqs.contains_key(t))
            .map(|t| {
                let idf = self.idf(&t);
                (t, idf)
            })
            .collect();

        if query_terms.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(usize, f64)> = self
            .docs
            .iter()
            .enumerate()
            .map(|(i, doc)| (i, self.score(doc, &query_terms)))
            .filter(|(_, score)| *score > 0.0)
            .collect();

        // Stable sort keeps corpus order among equal scores.
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);

        scored
            .into_iter()
            .map(|(i, score)| (Arc::clone(&self.docs[i].fragment), score))
            .collect()
    }
}

impl KeywordRetriever for Bm25Index {
    fn search(&self, query: &str, k: usize) -> Vec<Arc<Fragment>> {
        let results: Vec<Arc<Fragment>> = self
            .search_scored(query, k)
            .into_iter()
            .map(|(fragment, _)| fragment)
            .collect();
        tracing::debug!("Keyword search returned {} fragments", results.len());
        results
    }
}
