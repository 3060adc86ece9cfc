//! Ollama chat client
//!
//! Endpoint: POST /api/chat with `{model, messages, stream}`. A non-streamed
//! call returns one object; a streamed call returns one object per token
//! batch, the last with `done: true`.

use crate::errors::{RagError, Result};
use crate::streaming::parser::FrameParser;
use crate::streaming::ChatModel;
use crate::types::{ChatFrame, ChatMessage};
use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Default chat model
pub const DEFAULT_CHAT_MODEL: &str = "llama3";

/// Request timeout (120 seconds)
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Fragments buffered between the reader task and the consumer
const STREAM_CHANNEL_CAPACITY: usize = 64;

/// Ollama chat client
#[derive(Debug, Clone)]
pub struct ChatClient {
    client: Client,
    base_url: String,
    model: String,
    timeout: Duration,
}

impl ChatClient {
    /// Create client with default settings
    pub fn new() -> Result<Self> {
        Self::with_config(
            crate::embedding::DEFAULT_OLLAMA_URL,
            DEFAULT_CHAT_MODEL,
            REQUEST_TIMEOUT,
        )
    }

    /// Create client with custom configuration
    pub fn with_config(base_url: &str, model: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(RagError::HttpError)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            timeout,
        })
    }

    /// Send the request and turn HTTP failures into chat errors
    async fn send(&self, messages: &[ChatMessage], stream: bool) -> Result<Response> {
        let url = format!("{}/api/chat", self.base_url);
        let request = ChatRequest {
            model: &self.model,
            messages,
            stream,
        };

        debug!(model = %self.model, messages = messages.len(), stream, "sending chat request");

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
                    RagError::ChatUnavailable(format!("Failed to send request: {}", e))
                }
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        if status == StatusCode::NOT_FOUND && body.contains("not found") {
            return Err(RagError::ModelNotFound {
                model: self.model.clone(),
            });
        }
        Err(RagError::ChatUnavailable(format!("HTTP {}: {}", status, body)))
    }

    /// Check if Ollama is reachable
    pub async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/api/version", self.base_url);

        match self.client.get(&url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    /// Names of the models installed on the server
    pub async fn list_models(&self) -> Result<Vec<String>> {
        let url = format!("{}/api/tags", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| RagError::ChatUnavailable(format!("Failed to list models: {}", e)))?;

        if !response.status().is_success() {
            return Err(RagError::ChatUnavailable(format!(
                "Failed to retrieve model list: HTTP {}",
                response.status()
            )));
        }

        let models: ModelsResponse = response.json().await?;
        Ok(models.models.into_iter().map(|m| m.name).collect())
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
impl ChatModel for ChatClient {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String> {
        let response = self.send(messages, false).await?;
        let frame: ChatFrame = response
            .json()
            .await
            .map_err(|e| RagError::ChatUnavailable(format!("Invalid chat response: {}", e)))?;

        if let Some(error) = &frame.error {
            return Err(RagError::ChatUnavailable(error.clone()));
        }
        Ok(frame.content().to_string())
    }

    async fn chat_stream(&self, messages: Vec<ChatMessage>) -> Result<mpsc::Receiver<Result<String>>> {
        let response = self.send(&messages, true).await?;
        let (tx, rx) = mpsc::channel(STREAM_CHANNEL_CAPACITY);

        tokio::spawn(forward_frames(response, tx));
        Ok(rx)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Decode the response body and push content fragments into `tx`
///
/// Returns when the final frame arrives, the body ends or fails, or the
/// receiver goes away. A body that ends without `done: true` yields a
/// trailing `StreamingError`.
async fn forward_frames(response: Response, tx: mpsc::Sender<Result<String>>) {
    let mut body = response.bytes_stream();
    let mut parser = FrameParser::new();

    while let Some(chunk) = body.next().await {
        let frames = match chunk
            .map_err(|e| RagError::StreamingError(e.to_string()))
            .and_then(|bytes| parser.push(&bytes))
        {
            Ok(frames) => frames,
            Err(e) => {
                warn!(error = %e, "chat stream failed");
                let _ = tx.send(Err(e)).await;
                return;
            }
        };

        for frame in frames {
            if let Some(error) = &frame.error {
                let _ = tx.send(Err(RagError::ChatUnavailable(error.clone()))).await;
                return;
            }

            let content = frame.content();
            if !content.is_empty() && tx.send(Ok(content.to_string())).await.is_err() {
                debug!("chat stream receiver dropped, stopping");
                return;
            }

            if frame.done {
                return;
            }
        }
    }

    // Only a `done` frame ends a reply; anything else is a cut-off body
    let reason = if parser.is_drained() {
        "stream ended before done"
    } else {
        "stream ended inside a frame"
    };
    warn!(reason, "chat stream truncated");
    let _ = tx.send(Err(RagError::StreamingError(reason.to_string()))).await;
}

/// Ollama chat request
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

/// Ollama models list response
#[derive(Debug, Deserialize)]
struct ModelsResponse {
    models: Vec<ModelInfo>,
}

#[derive(Debug, Deserialize)]
struct ModelInfo {
    name: String,
}
