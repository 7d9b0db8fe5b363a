//! Deterministic trigram embeddings for offline use and tests.

use normas_core::AppResult;
use std::collections::{BTreeMap, HashSet};

use crate::embeddings::EmbeddingProvider;
use crate::text::tokenize;

/// Portuguese function words that carry no signal for similarity.
const STOP_WORDS: &[&str] = &[
    "a", "o", "as", "os", "de", "da", "do", "das", "dos", "e", "em", "no", "na", "nos", "nas",
    "um", "uma", "para", "por", "com", "que", "se", "ao", "aos", "ou", "sobre", "qual", "quais",
    "como", "sua", "seu", "pela", "pelo",
];

/// Hashes character trigrams and whole words of the folded text into a
/// fixed number of buckets, then normalises to a unit vector. Similar
/// wording gives similar vectors; meaning does not.
#[derive(Debug)]
pub struct MockProvider {
    dimensions: usize,
}

impl MockProvider {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn bucket(&self, token: &str, seed: u64) -> usize {
        let hash = token
            .bytes()
            .fold(0u64, |acc, b| acc.wrapping_mul(seed).wrapping_add(b as u64));
        (hash as usize) % self.dimensions
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0f32; self.dimensions];
        let stop_words: HashSet<&str> = STOP_WORDS.iter().copied().collect();

        // Ordered so bucket sums are accumulated identically on every run
        let mut word_freq: BTreeMap<String, u32> = BTreeMap::new();
        for word in tokenize(text) {
            if word.chars().count() > 1 && !stop_words.contains(word.as_str()) {
                *word_freq.entry(word).or_default() += 1;
            }
        }

        for (word, freq) in &word_freq {
            let chars: Vec<char> = word.chars().collect();
            for window in chars.windows(3) {
                let trigram: String = window.iter().collect();
                embedding[self.bucket(&trigram, 37)] += (*freq as f32).sqrt();
            }
            embedding[self.bucket(word, 31)] += *freq as f32;
        }

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut embedding {
                *v /= norm;
            }
        }

        embedding
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for MockProvider {
    fn provider_name(&self) -> &str {
        "mock"
    }

    fn model_name(&self) -> &str {
        "trigram-v1"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed_text(text)).collect())
    }
}
