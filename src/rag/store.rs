//! JSON-file vector store
//!
//! The whole index lives in memory as one ordered `Vec<VectorEntry>` and is
//! written back to a single JSON file on every rebuild. Readers take cheap
//! `Arc` snapshots, so a rebuild never blocks a running search.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::errors::{RagError, Result};
use crate::rag::topic::Topic;

/// Where a chunk came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryMetadata {
    /// File name
    pub source: String,
    /// Absolute path at indexing time
    pub path: String,
}

/// One embedded chunk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorEntry {
    pub text: String,
    pub embedding: Vec<f32>,
    pub topic: Topic,
    pub metadata: EntryMetadata,
}

#[derive(Debug, Default)]
struct StoreState {
    loaded: bool,
    entries: Arc<Vec<VectorEntry>>,
}

/// In-memory vector collection backed by one JSON file
#[derive(Debug)]
pub struct VectorStore {
    path: PathBuf,
    state: RwLock<StoreState>,
}

impl VectorStore {
    /// Create a store bound to `path`; nothing is read until first use
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            state: RwLock::new(StoreState::default()),
        }
    }

    /// Backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the file once; later calls are no-ops until `reload`
    pub async fn load(&self) {
        if self.state.read().await.loaded {
            return;
        }

        let mut state = self.state.write().await;
        if state.loaded {
            return;
        }
        state.entries = Arc::new(self.read_file().await);
        state.loaded = true;
    }

    /// Drop the cached collection and read the file again
    pub async fn reload(&self) {
        let entries = self.read_file().await;
        let mut state = self.state.write().await;
        state.entries = Arc::new(entries);
        state.loaded = true;
    }

    /// Missing file → empty; unreadable or corrupt file → empty with a warning
    async fn read_file(&self) -> Vec<VectorEntry> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no vector store on disk yet");
                return Vec::new();
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to read vector store, starting empty");
                return Vec::new();
            }
        };

        match serde_json::from_slice::<Vec<VectorEntry>>(&bytes) {
            Ok(entries) => {
                info!(entries = entries.len(), "loaded vector store");
                entries
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "corrupt vector store, starting empty");
                Vec::new()
            }
        }
    }

    /// Replace the whole collection: persist first, then swap in memory
    ///
    /// If the write fails the previous collection stays in place, both in
    /// memory and on disk.
    pub async fn rebuild(&self, entries: Vec<VectorEntry>) -> Result<usize> {
        self.persist(&entries).await?;

        let count = entries.len();
        let mut state = self.state.write().await;
        state.entries = Arc::new(entries);
        state.loaded = true;
        info!(entries = count, path = %self.path.display(), "vector store rebuilt");
        Ok(count)
    }

    async fn persist(&self, entries: &[VectorEntry]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| self.persistence_error(e))?;
            }
        }

        let json = serde_json::to_vec(entries).map_err(|e| self.persistence_error(e))?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| self.persistence_error(e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| self.persistence_error(e))?;

        Ok(())
    }

    fn persistence_error(&self, reason: impl std::fmt::Display) -> RagError {
        RagError::Persistence {
            path: self.path.clone(),
            reason: reason.to_string(),
        }
    }

    /// Whether the index holds anything (loads lazily)
    pub async fn status(&self) -> bool {
        !self.snapshot().await.is_empty()
    }

    /// Number of entries (loads lazily)
    pub async fn len(&self) -> usize {
        self.snapshot().await.len()
    }

    /// Shared view of the current collection (loads lazily)
    pub async fn snapshot(&self) -> Arc<Vec<VectorEntry>> {
        self.load().await;
        Arc::clone(&self.state.read().await.entries)
    }
}
