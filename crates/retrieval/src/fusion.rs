//! Weighted reciprocal rank fusion.
//!
//! `score(f) = Σ weight_i / (rank_i(f) + c)` with 1-based ranks. Fragments
//! are identified by their text. Equal scores keep first-seen order, so the
//! output is fully determined by the inputs.

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::fragment_set::content_hash;
use crate::types::Fragment;

/// Default rank smoothing constant.
pub const DEFAULT_RRF_C: f64 = 60.0;

/// Which retrieval path produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RetrievalPath {
    Keyword,
    Vector,
    DirectLookup,
    Hypothetical,
    Scoped,
}

/// A fused candidate. Provenance lists every path that returned it.
#[derive(Debug, Clone)]
pub struct RetrievalCandidate {
    pub fragment: Arc<Fragment>,
    pub score: f64,
    pub provenance: Vec<RetrievalPath>,
}

/// One ranked list entering fusion.
#[derive(Debug, Clone)]
pub struct RankedList {
    pub path: RetrievalPath,
    pub weight: f64,
    pub fragments: Vec<Arc<Fragment>>,
}

impl RankedList {
    pub fn new(path: RetrievalPath, weight: f64, fragments: Vec<Arc<Fragment>>) -> Self {
        Self {
            path,
            weight,
            fragments,
        }
    }
}

/// Fuse a keyword list and a vector list.
pub fn fuse(
    keyword: Vec<Arc<Fragment>>,
    vector: Vec<Arc<Fragment>>,
    keyword_weight: f64,
    vector_weight: f64,
) -> Vec<RetrievalCandidate> {
    fuse_with(
        vec![
            RankedList::new(RetrievalPath::Keyword, keyword_weight, keyword),
            RankedList::new(RetrievalPath::Vector, vector_weight, vector),
        ],
        DEFAULT_RRF_C,
    )
}

/// Fuse any number of ranked lists.
///
/// Only the first occurrence of a fragment inside one list counts. A list
/// with weight zero adds no score but still contributes its fragments.
pub fn fuse_with(lists: Vec<RankedList>, c: f64) -> Vec<RetrievalCandidate> {
    let mut candidates: Vec<RetrievalCandidate> = Vec::new();
    let mut by_content: HashMap<[u8; 32], usize> = HashMap::new();

    for list in lists {
        let mut seen_in_list: HashSet<[u8; 32]> = HashSet::new();
        let mut rank = 0usize;

        for fragment in list.fragments {
            let key = content_hash(&fragment.content);
            if !seen_in_list.insert(key) {
                continue;
            }
            rank += 1;
            let contribution = list.weight / (rank as f64 + c);

            match by_content.get(&key) {
                Some(&i) => {
                    let candidate = &mut candidates[i];
                    candidate.score += contribution;
                    if !candidate.provenance.contains(&list.path) {
                        candidate.provenance.push(list.path);
                    }
                }
                None => {
                    by_content.insert(key, candidates.len());
                    candidates.push(RetrievalCandidate {
                        fragment,
                        score: contribution,
                        provenance: vec![list.path],
                    });
                }
            }
        }
    }

    candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    candidates
}

/// Fragments of the fused candidates, best first.
pub fn fragments_of(candidates: Vec<RetrievalCandidate>) -> Vec<Arc<Fragment>> {
    candidates.into_iter().map(|c| c.fragment).collect()
}
