//! Loading the ordered fragment corpus from a JSON-lines file.

use normas_core::{AppError, AppResult};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::store::FragmentStore;
use crate::types::{Fragment, FragmentMetadata};

/// One line of the corpus file.
#[derive(Debug, Deserialize)]
struct CorpusRecord {
    content: String,
    #[serde(default)]
    metadata: FragmentMetadata,
    #[serde(default)]
    embedding: Option<Vec<f32>>,
}

/// Store plus the precomputed embeddings, aligned by store position.
#[derive(Debug)]
pub struct LoadedCorpus {
    pub store: FragmentStore,
    pub embeddings: Vec<Option<Vec<f32>>>,
}

impl LoadedCorpus {
    /// Fragments that still need an embedding.
    pub fn missing_embeddings(&self) -> usize {
        self.embeddings.iter().filter(|e| e.is_none()).count()
    }
}

/// Read a corpus file. A missing file is an error, an empty one is not.
pub fn load_corpus(path: &Path) -> AppResult<LoadedCorpus> {
    let file = File::open(path).map_err(|e| {
        AppError::Retrieval(format!("Failed to open corpus {}: {}", path.display(), e))
    })?;

    let reader = BufReader::new(file);
    let mut fragments = Vec::new();
    let mut vectors = Vec::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| {
            AppError::Retrieval(format!("Failed to read line {}: {}", line_num + 1, e))
        })?;

        if line.trim().is_empty() {
            continue;
        }

        let record: CorpusRecord = serde_json::from_str(&line).map_err(|e| {
            AppError::Retrieval(format!(
                "Failed to parse line {} in {}: {}",
                line_num + 1,
                path.display(),
                e
            ))
        })?;

        let position = record.metadata.sequence_position.unwrap_or(fragments.len());
        vectors.push((position, record.embedding));
        fragments.push(Fragment::new(record.content, record.metadata));
    }

    let store = FragmentStore::from_fragments(fragments)?;

    let mut embeddings = vec![None; store.len()];
    for (position, embedding) in vectors {
        embeddings[position] = embedding;
    }

    tracing::debug!(
        "Loaded {} fragments from {} ({} without embeddings)",
        store.len(),
        path.display(),
        embeddings.iter().filter(|e| e.is_none()).count()
    );

    Ok(LoadedCorpus { store, embeddings })
}
