//! Text embedding
//!
//! The `Embedder` trait is the seam between the indexer/search and whatever
//! produces vectors. Production code talks to Ollama; tests plug in their own.

pub mod client;

use crate::errors::Result;
use async_trait::async_trait;

pub use client::{OllamaEmbedder, DEFAULT_EMBED_MODEL, DEFAULT_OLLAMA_URL};

/// Produces a fixed-length vector for a piece of text
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed one text; failures surface as `RagError::EmbeddingUnavailable`
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Model identifier, for logs and errors
    fn model(&self) -> &str;
}
