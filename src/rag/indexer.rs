//! Batch indexing pipeline: locate → extract → chunk → classify → embed
//!
//! Files are processed `batch_size` at a time; inside one file every chunk
//! is embedded concurrently and the results are kept in chunk order. Any
//! failure inside a file drops that file only.

use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::documents::{locate_pdf_files, TextExtractor};
use crate::embedding::Embedder;
use crate::errors::Result;
use crate::rag::chunker::{chunk, ChunkParams};
use crate::rag::store::{EntryMetadata, VectorEntry};
use crate::rag::topic::classify;

/// Outcome of a re-index run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexReport {
    pub success: bool,
    /// Chunks written to the store
    pub count: usize,
    pub files_found: usize,
    pub files_indexed: usize,
    pub files_skipped: usize,
}

/// Entries produced by one pass plus per-file bookkeeping
#[derive(Debug, Default)]
pub struct IndexBuild {
    pub entries: Vec<VectorEntry>,
    pub files_found: usize,
    pub files_indexed: usize,
    pub files_skipped: usize,
}

impl IndexBuild {
    pub fn report(&self) -> IndexReport {
        IndexReport {
            success: true,
            count: self.entries.len(),
            files_found: self.files_found,
            files_indexed: self.files_indexed,
            files_skipped: self.files_skipped,
        }
    }
}

/// Builds a fresh set of vector entries from a document root
pub struct Indexer {
    embedder: Arc<dyn Embedder>,
    extractor: Arc<dyn TextExtractor>,
    params: ChunkParams,
    batch_size: usize,
}

impl Indexer {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        extractor: Arc<dyn TextExtractor>,
        params: ChunkParams,
        batch_size: usize,
    ) -> Self {
        Self {
            embedder,
            extractor,
            params,
            batch_size: batch_size.max(1),
        }
    }

    /// Index every PDF under `root`; never fails as a whole
    pub async fn build(&self, root: &Path) -> IndexBuild {
        let files = locate_pdf_files(root).await;
        info!(files = files.len(), root = %root.display(), "found PDF files to index");

        let mut build = IndexBuild {
            files_found: files.len(),
            ..Default::default()
        };
        let mut dimension: Option<usize> = None;

        for batch in files.chunks(self.batch_size) {
            let results = join_all(batch.iter().map(|file| self.index_file(file))).await;

            for (file, result) in batch.iter().zip(results) {
                match result {
                    Ok(entries) => {
                        let kept = keep_matching_dimension(entries, &mut dimension, file);
                        info!(file = %display_name(file), chunks = kept.len(), "indexed file");
                        build.entries.extend(kept);
                        build.files_indexed += 1;
                    }
                    Err(e) => {
                        error!(file = %file.display(), error = %e, "failed to index file, skipping");
                        build.files_skipped += 1;
                    }
                }
            }
        }

        build
    }

    /// Extract, chunk and embed one file
    pub async fn index_file(&self, file: &Path) -> Result<Vec<VectorEntry>> {
        let text = self.extractor.extract(file).await?;

        let source = display_name(file);
        let path = absolute(file).await.to_string_lossy().to_string();
        let topic = classify(&source, &path);

        let chunks: Vec<String> = chunk(&text, self.params)
            .into_iter()
            .filter(|c| !c.trim().is_empty())
            .collect();

        let embeddings = join_all(chunks.iter().map(|c| self.embedder.embed(c))).await;

        chunks
            .into_iter()
            .zip(embeddings)
            .map(|(text, embedding)| -> Result<VectorEntry> {
                Ok(VectorEntry {
                    text,
                    embedding: embedding?,
                    topic,
                    metadata: EntryMetadata {
                        source: source.clone(),
                        path: path.clone(),
                    },
                })
            })
            .collect()
    }
}

/// Drop entries whose dimension differs from the first one seen in this pass
fn keep_matching_dimension(
    entries: Vec<VectorEntry>,
    dimension: &mut Option<usize>,
    file: &Path,
) -> Vec<VectorEntry> {
    let mut kept = Vec::with_capacity(entries.len());

    for entry in entries {
        let dim = entry.embedding.len();
        match *dimension {
            None => {
                *dimension = Some(dim);
                kept.push(entry);
            }
            Some(expected) if expected == dim => kept.push(entry),
            Some(expected) => {
                warn!(
                    file = %file.display(),
                    expected,
                    actual = dim,
                    "embedding dimension mismatch, dropping chunk"
                );
            }
        }
    }

    kept
}

fn display_name(file: &Path) -> String {
    file.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| file.to_string_lossy().to_string())
}

async fn absolute(file: &Path) -> PathBuf {
    tokio::fs::canonicalize(file)
        .await
        .unwrap_or_else(|_| file.to_path_buf())
}
