//! Read-only ordered fragment store.
//!
//! Fragments are kept sorted by `sequence_position`, so a fragment's index
//! in the store is its position in the corpus.

use normas_core::{AppError, AppResult};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::filter::MetadataFilter;
use crate::types::{Fragment, NormType};

/// One source document of the corpus.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentSummary {
    pub source_document: String,
    pub norm_type: Option<NormType>,
    pub norm_number: Option<String>,
    pub fragment_count: usize,
}

#[derive(Debug, Clone, Default)]
pub struct FragmentStore {
    fragments: Vec<Arc<Fragment>>,
}

impl FragmentStore {
    /// Build a store from fragments in corpus order.
    ///
    /// Fragments without a `sequence_position` get their index in the input.
    /// Positions must then be unique and cover `0..N`.
    pub fn from_fragments(fragments: Vec<Fragment>) -> AppResult<Self> {
        let total = fragments.len();
        let mut slots: Vec<Option<Arc<Fragment>>> = vec![None; total];

        for (index, mut fragment) in fragments.into_iter().enumerate() {
            let position = *fragment.metadata.sequence_position.get_or_insert(index);
            if position >= total {
                return Err(AppError::Retrieval(format!(
                    "sequence_position {} out of range for a corpus of {} fragments",
                    position, total
                )));
            }
            if slots[position].is_some() {
                return Err(AppError::Retrieval(format!(
                    "duplicate sequence_position {}",
                    position
                )));
            }
            slots[position] = Some(Arc::new(fragment));
        }

        // Unique positions inside 0..N fill every slot.
        let fragments = slots.into_iter().flatten().collect();
        Ok(Self { fragments })
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&Arc<Fragment>> {
        self.fragments.get(position)
    }

    pub fn fragments(&self) -> &[Arc<Fragment>] {
        &self.fragments
    }

    /// Fragments at `position - 1 ..= position + 1`, clipped to corpus bounds.
    pub fn neighbours(&self, position: usize) -> &[Arc<Fragment>] {
        if position >= self.fragments.len() {
            return &[];
        }
        let start = position.saturating_sub(1);
        let end = (position + 2).min(self.fragments.len());
        &self.fragments[start..end]
    }

    /// Full scan for fragments whose norm type and number equal the filter's.
    pub fn lookup(&self, filter: &MetadataFilter) -> Vec<Arc<Fragment>> {
        if !filter.is_exact() {
            return Vec::new();
        }
        self.fragments
            .iter()
            .filter(|f| filter.matches_norm(f))
            .cloned()
            .collect()
    }

    /// Every fragment of `source_document` under the given article header.
    pub fn article_fragments(&self, source_document: &str, article: &str) -> Vec<Arc<Fragment>> {
        self.fragments
            .iter()
            .filter(|f| {
                f.metadata.source_document == source_document
                    && f.metadata.article() == Some(article)
            })
            .cloned()
            .collect()
    }

    /// Source documents in first-seen corpus order.
    pub fn documents(&self) -> Vec<DocumentSummary> {
        let mut summaries: Vec<DocumentSummary> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();

        for fragment in &self.fragments {
            let meta = &fragment.metadata;
            match index.get(meta.source_document.as_str()) {
                Some(&i) => summaries[i].fragment_count += 1,
                None => {
                    index.insert(meta.source_document.as_str(), summaries.len());
                    summaries.push(DocumentSummary {
                        source_document: meta.source_document.clone(),
                        norm_type: meta.norm_type,
                        norm_number: meta.norm_number.clone(),
                        fragment_count: 1,
                    });
                }
            }
        }

        summaries
    }

    /// First source document, in corpus order, with a fragment matching the filter.
    pub fn first_document_matching(&self, filter: &MetadataFilter) -> Option<String> {
        self.fragments
            .iter()
            .find(|f| filter.matches_norm(f) && f.metadata.source().is_some())
            .map(|f| f.metadata.source_document.clone())
    }

    /// Fragments satisfying `predicate`, in corpus order.
    pub fn subset<P>(&self, predicate: P) -> Vec<Arc<Fragment>>
    where
        P: Fn(&Fragment) -> bool,
    {
        self.fragments
            .iter()
            .filter(|f| predicate(f))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FragmentMetadata;

    fn frag(text: &str, doc: &str, position: Option<usize>) -> Fragment {
        let mut meta = FragmentMetadata::new(doc).with_norm(NormType::Resolucao, "4958");
        meta.sequence_position = position;
        Fragment::new(text, meta)
    }

    #[test]
    fn test_positions_assigned_from_line_order() {
        let store = FragmentStore::from_fragments(vec![
            frag("a", "A.pdf", None),
            frag("b", "A.pdf", None),
        ])
        .unwrap();
        assert_eq!(store.get(1).unwrap().metadata.sequence_position, Some(1));
    }

    #[test]
    fn test_explicit_positions_reorder() {
        let store = FragmentStore::from_fragments(vec![
            frag("segundo", "A.pdf", Some(1)),
            frag("primeiro", "A.pdf", Some(0)),
        ])
        .unwrap();
        assert_eq!(store.get(0).unwrap().content, "primeiro");
    }

    #[test]
    fn test_duplicate_position_rejected() {
        let result = FragmentStore::from_fragments(vec![
            frag("a", "A.pdf", Some(0)),
            frag("b", "A.pdf", Some(0)),
        ]);
        assert!(matches!(result, Err(AppError::Retrieval(_))));
    }

    #[test]
    fn test_gap_rejected() {
        let result = FragmentStore::from_fragments(vec![
            frag("a", "A.pdf", Some(0)),
            frag("b", "A.pdf", Some(2)),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_neighbours_clipped() {
        let store = FragmentStore::from_fragments(vec![
            frag("a", "A.pdf", None),
            frag("b", "A.pdf", None),
            frag("c", "B.pdf", None),
        ])
        .unwrap();
        assert_eq!(store.neighbours(0).len(), 2);
        assert_eq!(store.neighbours(1).len(), 3);
        assert_eq!(store.neighbours(2).len(), 2);
        assert!(store.neighbours(5).is_empty());
    }

    #[test]
    fn test_documents_in_first_seen_order() {
        let store = FragmentStore::from_fragments(vec![
            frag("a", "B.pdf", None),
            frag("b", "A.pdf", None),
            frag("c", "B.pdf", None),
        ])
        .unwrap();
        let docs = store.documents();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].source_document, "B.pdf");
        assert_eq!(docs[0].fragment_count, 2);
        assert_eq!(docs[1].fragment_count, 1);
    }

    #[test]
    fn test_lookup_needs_exact_filter() {
        let store = FragmentStore::from_fragments(vec![frag("a", "A.pdf", None)]).unwrap();
        assert_eq!(
            store
                .lookup(&MetadataFilter::new().with_norm(NormType::Resolucao, "4958"))
                .len(),
            1
        );
        assert!(store.lookup(&MetadataFilter::new()).is_empty());
    }
}
