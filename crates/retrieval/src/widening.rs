//! Context widening.
//!
//! Re-ranking leaves a handful of precise fragments. Widening pulls their
//! surroundings back in, either the whole enclosing article (structural) or
//! the fragments right before and after in corpus order (positional).

use std::collections::HashSet;
use std::sync::Arc;

use crate::fragment_set::FragmentSet;
use crate::store::FragmentStore;
use crate::types::Fragment;

/// Which neighbours positional widening may accept.
#[derive(Debug, Clone, Copy)]
pub enum NeighbourScope<'a> {
    /// Same `source_document` as the anchor.
    SameDocument,
    /// Any of the listed documents.
    Documents(&'a [String]),
}

impl NeighbourScope<'_> {
    fn accepts(&self, anchor: &Fragment, neighbour: &Fragment) -> bool {
        match self {
            Self::SameDocument => {
                neighbour.metadata.source_document == anchor.metadata.source_document
            }
            Self::Documents(documents) => documents
                .iter()
                .any(|d| *d == neighbour.metadata.source_document),
        }
    }
}

/// Expand the first `top_n` candidates to every fragment of their article,
/// then append the remaining candidates unchanged.
///
/// Articles are keyed by `(source_document, article)`, so the same article
/// header in another norm is never pulled in. Each is expanded once.
/// Candidates without an article are kept as they are.
pub fn widen_structural(
    candidates: &[Arc<Fragment>],
    store: &FragmentStore,
    top_n: usize,
) -> FragmentSet {
    let mut widened = FragmentSet::new();
    let mut processed: HashSet<(String, String)> = HashSet::new();
    let split = top_n.min(candidates.len());

    for candidate in &candidates[..split] {
        match candidate.metadata.article() {
            Some(article) => {
                let key = (
                    candidate.metadata.source_document.clone(),
                    article.to_string(),
                );
                if processed.insert(key) {
                    let siblings =
                        store.article_fragments(&candidate.metadata.source_document, article);
                    tracing::debug!(
                        "Widening {} of {} to {} fragments",
                        article,
                        candidate.metadata.source_document,
                        siblings.len()
                    );
                    widened.extend(siblings);
                }
                widened.push(Arc::clone(candidate));
            }
            None => {
                widened.push(Arc::clone(candidate));
            }
        }
    }

    widened.extend(candidates[split..].iter().cloned());
    widened
}

/// Add each of the first `top_n` anchors together with its neighbours at
/// position ±1 that `scope` accepts. Anchors are always included.
pub fn widen_positional(
    anchors: &[Arc<Fragment>],
    store: &FragmentStore,
    top_n: usize,
    scope: NeighbourScope<'_>,
) -> FragmentSet {
    let mut widened = FragmentSet::new();

    for anchor in anchors.iter().take(top_n) {
        push_with_neighbours(&mut widened, anchor, store, scope);
    }

    widened
}

/// Push `anchor` preceded and followed by its accepted neighbours, in corpus order.
pub fn push_with_neighbours(
    widened: &mut FragmentSet,
    anchor: &Arc<Fragment>,
    store: &FragmentStore,
    scope: NeighbourScope<'_>,
) {
    let Some(position) = anchor.metadata.sequence_position else {
        widened.push(Arc::clone(anchor));
        return;
    };

    let window = store.neighbours(position);
    if window.is_empty() {
        widened.push(Arc::clone(anchor));
        return;
    }

    for fragment in window {
        let is_anchor = fragment.metadata.sequence_position == Some(position);
        if is_anchor {
            widened.push(Arc::clone(anchor));
        } else if scope.accepts(anchor, fragment) {
            widened.push(Arc::clone(fragment));
        }
    }
}
