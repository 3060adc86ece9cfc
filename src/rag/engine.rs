//! Retrieval engine: owns the store, runs re-indexing and role-filtered search
//!
//! One engine per process (or per test). Nothing is global: configuration,
//! embedder, extractor and settings are injected.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::cli::Config;
use crate::documents::{PdfExtractor, TextExtractor};
use crate::embedding::{Embedder, OllamaEmbedder};
use crate::errors::Result;
use crate::rag::chunker::ChunkParams;
use crate::rag::indexer::{IndexReport, Indexer};
use crate::rag::search::{any_visible, rank, ScoredEntry, DEFAULT_TOP_K};
use crate::rag::store::VectorStore;
use crate::retry::RetryPolicy;
use crate::roles::Role;
use crate::settings::SettingsStore;

/// Tunables for one engine
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub chunk: ChunkParams,
    pub file_batch_size: usize,
    pub top_k: usize,
    /// Document root when no DOCS_PATH setting exists
    pub default_docs_path: PathBuf,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            chunk: ChunkParams::default(),
            file_batch_size: 2,
            top_k: DEFAULT_TOP_K,
            default_docs_path: PathBuf::from("normes"),
        }
    }
}

impl EngineOptions {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            chunk: ChunkParams::new(config.indexing.chunk_size, config.indexing.chunk_overlap)?,
            file_batch_size: config.indexing.file_batch_size,
            top_k: config.search.top_k,
            default_docs_path: config.default_docs_path(),
        })
    }
}

/// Index + search over a document corpus
pub struct RagEngine {
    store: VectorStore,
    settings: SettingsStore,
    embedder: Arc<dyn Embedder>,
    extractor: Arc<dyn TextExtractor>,
    options: EngineOptions,
    /// Serializes re-index runs
    index_lock: Mutex<()>,
}

impl RagEngine {
    pub fn new(
        store: VectorStore,
        settings: SettingsStore,
        embedder: Arc<dyn Embedder>,
        extractor: Arc<dyn TextExtractor>,
        options: EngineOptions,
    ) -> Self {
        Self {
            store,
            settings,
            embedder,
            extractor,
            options,
            index_lock: Mutex::new(()),
        }
    }

    /// Production wiring: Ollama embeddings, PDF extraction, files under state_dir
    pub fn from_config(config: &Config) -> Result<Self> {
        let embedder = OllamaEmbedder::with_config(
            &config.ollama_url(),
            &config.ollama.embed_model,
            Duration::from_secs(config.ollama.request_timeout_secs),
        )?
        .with_retry(RetryPolicy::with_attempts(config.ollama.embed_attempts));

        Ok(Self::new(
            VectorStore::new(config.vector_db_path()),
            SettingsStore::new(config.settings_path()),
            Arc::new(embedder),
            Arc::new(PdfExtractor::new()),
            EngineOptions::from_config(config)?,
        ))
    }

    /// Whether the index holds any entries
    pub async fn status(&self) -> bool {
        self.store.status().await
    }

    /// Document root currently in effect
    pub fn docs_path(&self) -> PathBuf {
        self.settings.docs_path(&self.options.default_docs_path)
    }

    /// Rebuild the whole index from the document root
    ///
    /// The previous index stays searchable until the new one is persisted.
    /// Only a persistence failure makes this return an error.
    pub async fn reindex(&self) -> Result<IndexReport> {
        let _guard = self.index_lock.lock().await;

        let root = self.docs_path();
        info!(root = %root.display(), "re-indexing documents");

        let indexer = Indexer::new(
            Arc::clone(&self.embedder),
            Arc::clone(&self.extractor),
            self.options.chunk,
            self.options.file_batch_size,
        );
        let build = indexer.build(&root).await;
        let report = build.report();

        self.store.rebuild(build.entries).await?;
        info!(
            chunks = report.count,
            files = report.files_indexed,
            skipped = report.files_skipped,
            "re-index complete"
        );
        Ok(report)
    }

    /// Top-k chunk texts for `query` visible to `role`
    pub async fn search(&self, query: &str, role: Role, k: usize) -> Result<Vec<String>> {
        Ok(self
            .search_scored(query, role, k)
            .await?
            .into_iter()
            .map(|hit| hit.text)
            .collect())
    }

    /// Top-k with the configured default k
    pub async fn search_default(&self, query: &str, role: Role) -> Result<Vec<String>> {
        self.search(query, role, self.options.top_k).await
    }

    /// Top-k hits with scores and sources
    ///
    /// Empty store or nothing visible to the role → empty, without calling
    /// the embedder. Embedding failures are returned to the caller.
    pub async fn search_scored(&self, query: &str, role: Role, k: usize) -> Result<Vec<ScoredEntry>> {
        let entries = self.store.snapshot().await;
        if entries.is_empty() || !any_visible(&entries, role) || k == 0 {
            debug!(%role, "nothing searchable for role");
            return Ok(Vec::new());
        }

        let query_vector = self.embedder.embed(query).await?;
        Ok(rank(&entries, &query_vector, role, k))
    }

    pub fn store(&self) -> &VectorStore {
        &self.store
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Config;

    #[test]
    fn test_options_from_config() {
        let mut config = Config::default();
        config.indexing.chunk_size = 500;
        config.indexing.chunk_overlap = 50;
        config.search.top_k = 7;

        let options = EngineOptions::from_config(&config).unwrap();
        assert_eq!(options.chunk, ChunkParams::new(500, 50).unwrap());
        assert_eq!(options.top_k, 7);
        assert_eq!(options.file_batch_size, 2);
    }

    #[test]
    fn test_options_reject_bad_window() {
        let mut config = Config::default();
        config.indexing.chunk_overlap = config.indexing.chunk_size;
        assert!(EngineOptions::from_config(&config).is_err());
    }
}
