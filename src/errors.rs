//! Error types for grcrag
//!
//! One error enum for the whole retrieval pipeline. Per-file failures are
//! caught by the indexer; everything else propagates to the caller.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for indexing, search and chat
#[derive(Error, Debug)]
pub enum RagError {
    /// Embedding service unreachable, rejected the request, or lacks the model
    #[error("Embedding unavailable for model {model}: {reason}")]
    EmbeddingUnavailable { model: String, reason: String },

    /// Chat model missing on the Ollama server
    #[error("Model '{model}' not found. Run 'ollama pull {model}' on the model host.")]
    ModelNotFound { model: String },

    /// Chat endpoint failures other than a missing model
    #[error("Chat request failed: {0}")]
    ChatUnavailable(String),

    /// PDF (or other document) text extraction failed
    #[error("Failed to extract text from {path}: {reason}")]
    Extraction { path: PathBuf, reason: String },

    /// Vector store could not be written
    #[error("Failed to persist vector store to {path}: {reason}")]
    Persistence { path: PathBuf, reason: String },

    /// Streaming errors
    #[error("Streaming error: {0}")]
    StreamingError(String),

    /// JSON framing errors on streamed responses
    #[error("JSON parse error: {0}")]
    JsonParseError(String),

    /// Caller supplied something unusable (empty prompt, unknown role)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// HTTP client errors
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Timeout errors
    #[error("Operation timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },
}

/// Result type alias for grcrag operations
pub type Result<T> = std::result::Result<T, RagError>;

impl RagError {
    /// A request that outlived the client timeout
    pub fn timeout(limit: std::time::Duration) -> Self {
        RagError::Timeout {
            duration_ms: limit.as_millis() as u64,
        }
    }

    /// Build an `EmbeddingUnavailable` from anything displayable
    pub fn embedding(model: &str, reason: impl std::fmt::Display) -> Self {
        RagError::EmbeddingUnavailable {
            model: model.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedding_error_display() {
        let err = RagError::embedding("nomic-embed-text", "connection refused");
        let msg = err.to_string();
        assert!(msg.contains("nomic-embed-text"));
        assert!(msg.contains("connection refused"));
    }

    #[test]
    fn test_model_not_found_hint() {
        let err = RagError::ModelNotFound {
            model: "llama3".to_string(),
        };
        assert!(err.to_string().contains("ollama pull llama3"));
    }

    #[test]
    fn test_persistence_error_display() {
        let err = RagError::Persistence {
            path: PathBuf::from("/tmp/vector_db.json"),
            reason: "read-only file system".to_string(),
        };
        assert!(err.to_string().contains("vector_db.json"));
    }
}
