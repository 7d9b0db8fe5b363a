//! Insertion-ordered fragment collection deduplicated by content.

use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::sync::Arc;

use crate::types::Fragment;

/// SHA-256 digest of fragment text.
pub fn content_hash(text: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hasher.finalize().into()
}

/// Ordered set of fragments where two fragments with identical text are the
/// same element. The first occurrence wins.
#[derive(Debug, Clone, Default)]
pub struct FragmentSet {
    items: Vec<Arc<Fragment>>,
    seen: HashSet<[u8; 32]>,
}

impl FragmentSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a fragment. Returns false when its text was already present.
    pub fn push(&mut self, fragment: Arc<Fragment>) -> bool {
        if self.seen.insert(content_hash(&fragment.content)) {
            self.items.push(fragment);
            true
        } else {
            false
        }
    }

    pub fn extend<I>(&mut self, fragments: I)
    where
        I: IntoIterator<Item = Arc<Fragment>>,
    {
        for fragment in fragments {
            self.push(fragment);
        }
    }

    pub fn contains(&self, fragment: &Fragment) -> bool {
        self.seen.contains(&content_hash(&fragment.content))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Fragment>> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Arc<Fragment>] {
        &self.items
    }

    pub fn into_vec(self) -> Vec<Arc<Fragment>> {
        self.items
    }
}

impl FromIterator<Arc<Fragment>> for FragmentSet {
    fn from_iter<I: IntoIterator<Item = Arc<Fragment>>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FragmentMetadata;

    fn frag(text: &str, doc: &str) -> Arc<Fragment> {
        Arc::new(Fragment::new(text, FragmentMetadata::new(doc)))
    }

    #[test]
    fn test_content_hash_is_stable() {
        assert_eq!(content_hash("Art. 1"), content_hash("Art. 1"));
        assert_ne!(content_hash("Art. 1"), content_hash("Art. 2"));
    }

    #[test]
    fn test_duplicates_keep_first_occurrence() {
        let mut set = FragmentSet::new();
        assert!(set.push(frag("mesmo texto", "A.pdf")));
        assert!(set.push(frag("outro texto", "A.pdf")));
        assert!(!set.push(frag("mesmo texto", "B.pdf")));

        let items = set.into_vec();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].metadata.source_document, "A.pdf");
        assert_eq!(items[1].content, "outro texto");
    }

    #[test]
    fn test_contains_ignores_metadata() {
        let set: FragmentSet = vec![frag("texto", "A.pdf")].into_iter().collect();
        assert!(set.contains(&Fragment::new("texto", FragmentMetadata::new("Z.pdf"))));
        assert!(!set.contains(&Fragment::new("texto ", FragmentMetadata::new("A.pdf"))));
    }
}
