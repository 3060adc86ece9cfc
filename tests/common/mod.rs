//! Shared fakes for integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

use grcrag::documents::TextExtractor;
use grcrag::embedding::Embedder;
use grcrag::rag::{ChunkParams, EngineOptions, RagEngine, VectorStore};
use grcrag::settings::SettingsStore;
use grcrag::{RagError, Result};

/// Reads files as UTF-8 text; content starting with "CORRUPT" fails
pub struct PlainText;

#[async_trait]
impl TextExtractor for PlainText {
    async fn extract(&self, path: &Path) -> Result<String> {
        let text = tokio::fs::read_to_string(path).await?;
        if text.starts_with("CORRUPT") {
            return Err(RagError::Extraction {
                path: path.to_path_buf(),
                reason: "unreadable xref table".to_string(),
            });
        }
        Ok(text)
    }
}

/// Bag-of-keywords embedding: [risk, audit, general, 1]
///
/// Text containing "boom" fails, like an unreachable server.
#[derive(Default)]
pub struct KeywordEmbedder {
    calls: AtomicUsize,
}

impl KeywordEmbedder {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Embedder for KeywordEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if text.contains("boom") {
            return Err(RagError::embedding("keywords", "connection refused"));
        }

        let lower = text.to_lowercase();
        let count = |word: &str| lower.matches(word).count() as f32;
        Ok(vec![count("risk"), count("audit"), count("general"), 1.0])
    }

    fn model(&self) -> &str {
        "keywords"
    }
}

/// Engine over a temp state dir and a temp document root
pub struct Fixture {
    pub engine: RagEngine,
    pub embedder: Arc<KeywordEmbedder>,
    pub docs: TempDir,
    pub state: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        let docs = TempDir::new().unwrap();
        let state = TempDir::new().unwrap();
        let embedder = Arc::new(KeywordEmbedder::default());
        let engine = engine_at(&state, docs.path(), embedder.clone());

        Self {
            engine,
            embedder,
            docs,
            state,
        }
    }

    pub fn write_doc(&self, name: &str, text: &str) {
        std::fs::write(self.docs.path().join(name), text).unwrap();
    }

    /// A second engine over the same files, as after a restart
    pub fn reopen(&self) -> RagEngine {
        engine_at(&self.state, self.docs.path(), Arc::new(KeywordEmbedder::default()))
    }
}

pub fn engine_at(state: &TempDir, docs: &Path, embedder: Arc<KeywordEmbedder>) -> RagEngine {
    let options = EngineOptions {
        chunk: ChunkParams::new(1000, 200).unwrap(),
        file_batch_size: 2,
        top_k: 3,
        default_docs_path: docs.to_path_buf(),
    };

    RagEngine::new(
        VectorStore::new(state.path().join("storage").join("vector_db.json")),
        SettingsStore::new(state.path().join("settings.json")),
        embedder,
        Arc::new(PlainText),
        options,
    )
}

/// Three single-chunk documents, one per topic
pub fn write_corpus(fixture: &Fixture) {
    fixture.write_doc("iso27005.pdf", "risk treatment and risk appetite");
    fixture.write_doc("iso27001.pdf", "audit evidence and audit programme");
    fixture.write_doc("charte.pdf", "general governance charter");
}
