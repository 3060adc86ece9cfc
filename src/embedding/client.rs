//! Ollama embedding client
//!
//! Endpoint: POST /api/embeddings with `{model, prompt}` → `{embedding}`

use crate::embedding::Embedder;
use crate::errors::{RagError, Result};
use crate::retry::RetryPolicy;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Default Ollama API endpoint
pub const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";

/// Default embedding model
pub const DEFAULT_EMBED_MODEL: &str = "nomic-embed-text";

/// Request timeout (60 seconds)
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Embedder backed by a local Ollama server
#[derive(Debug, Clone)]
pub struct OllamaEmbedder {
    client: Client,
    base_url: String,
    model: String,
    retry: RetryPolicy,
    timeout: Duration,
}

impl OllamaEmbedder {
    /// Create embedder with default settings
    pub fn new() -> Result<Self> {
        Self::with_config(DEFAULT_OLLAMA_URL, DEFAULT_EMBED_MODEL, REQUEST_TIMEOUT)
    }

    /// Create embedder with custom configuration
    pub fn with_config(base_url: &str, model: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(RagError::HttpError)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            retry: RetryPolicy::none(),
            timeout,
        })
    }

    /// Retry transient failures according to `retry`
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// One request, without retry
    async fn request_embedding(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/api/embeddings", self.base_url);

        let request = EmbeddingRequest {
            model: &self.model,
            prompt: text,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RagError::timeout(self.timeout)
                } else {
                    RagError::HttpError(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            if status == StatusCode::NOT_FOUND && body.contains("not found") {
                return Err(RagError::ModelNotFound {
                    model: self.model.clone(),
                });
            }
            return Err(RagError::embedding(
                &self.model,
                format!("HTTP {}: {}", status, body),
            ));
        }

        let parsed: EmbeddingResponse = response.json().await?;
        if parsed.embedding.is_empty() {
            return Err(RagError::embedding(&self.model, "empty embedding returned"));
        }

        Ok(parsed.embedding)
    }

    /// Get current model name
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Get base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        debug!(model = %self.model, chars = text.len(), "requesting embedding");

        self.retry
            .execute(|| self.request_embedding(text))
            .await
            .map_err(|e| match e {
                RagError::EmbeddingUnavailable { .. } => e,
                RagError::ModelNotFound { model } => RagError::EmbeddingUnavailable {
                    reason: format!("model not found, run 'ollama pull {}'", model),
                    model,
                },
                other => RagError::embedding(&self.model, other),
            })
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Ollama embeddings request
#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

/// Ollama embeddings response
#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    #[serde(default)]
    embedding: Vec<f32>,
}
