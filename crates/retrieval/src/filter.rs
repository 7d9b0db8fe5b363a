//! Metadata filters.
//!
//! [`MetadataFilter`] is what the query parsers extract from a question.
//! [`FragmentFilter`] is the equality filter the vector retriever applies
//! before ranking.

use serde::{Deserialize, Serialize};

use crate::types::{Fragment, NormType};

/// Structured hints extracted from a question.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataFilter {
    pub norm_type: Option<NormType>,
    pub norm_number: Option<String>,
    /// Main technical term of the question
    pub topic: Option<String>,
    /// Article number, digits only
    pub article: Option<String>,
}

impl MetadataFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_norm(mut self, norm_type: NormType, norm_number: impl Into<String>) -> Self {
        self.norm_type = Some(norm_type);
        self.norm_number = Some(norm_number.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.norm_type.is_none()
            && self.norm_number.is_none()
            && self.topic.is_none()
            && self.article.is_none()
    }

    /// Both norm type and number are known, so a direct lookup is possible.
    pub fn is_exact(&self) -> bool {
        self.norm_type.is_some() && self.norm_number.is_some()
    }

    /// Exact type and number equality against a fragment.
    pub fn matches_norm(&self, fragment: &Fragment) -> bool {
        match (&self.norm_type, &self.norm_number) {
            (Some(norm_type), Some(number)) => {
                fragment.metadata.norm_type.as_ref() == Some(norm_type)
                    && fragment.metadata.norm_number.as_deref() == Some(number.as_str())
            }
            _ => false,
        }
    }

    /// Vector filter on the norm fields that are present.
    pub fn to_fragment_filter(&self) -> FragmentFilter {
        let mut filter = FragmentFilter::new();
        if let Some(norm_type) = self.norm_type {
            filter = filter.with_norm_type(norm_type);
        }
        if let Some(number) = &self.norm_number {
            filter = filter.with_norm_number(number.clone());
        }
        filter
    }
}

/// Equality filter over fragment metadata. Unset fields match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FragmentFilter {
    pub source_document: Option<String>,
    pub norm_type: Option<NormType>,
    pub norm_number: Option<String>,
}

impl FragmentFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to one source document
    pub fn with_source_document(mut self, source_document: impl Into<String>) -> Self {
        self.source_document = Some(source_document.into());
        self
    }

    pub fn with_norm_type(mut self, norm_type: NormType) -> Self {
        self.norm_type = Some(norm_type);
        self
    }

    pub fn with_norm_number(mut self, norm_number: impl Into<String>) -> Self {
        self.norm_number = Some(norm_number.into());
        self
    }

    pub fn has_filters(&self) -> bool {
        self.source_document.is_some() || self.norm_type.is_some() || self.norm_number.is_some()
    }

    pub fn matches(&self, fragment: &Fragment) -> bool {
        let meta = &fragment.metadata;
        if let Some(source) = &self.source_document {
            if &meta.source_document != source {
                return false;
            }
        }
        if let Some(norm_type) = &self.norm_type {
            if meta.norm_type.as_ref() != Some(norm_type) {
                return false;
            }
        }
        if let Some(number) = &self.norm_number {
            if meta.norm_number.as_deref() != Some(number.as_str()) {
                return false;
            }
        }
        true
    }
}
