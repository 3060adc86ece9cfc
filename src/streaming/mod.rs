//! Chat with the model
//!
//! Provides the Ollama chat client and the incremental frame decoder for
//! streamed replies.

pub mod client;
pub mod parser;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::errors::Result;
use crate::types::ChatMessage;

// Re-export commonly used types
pub use client::{ChatClient, DEFAULT_CHAT_MODEL};
pub use parser::{FrameParser, MAX_BUFFER_SIZE};

/// A chat-capable language model
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Full reply to `messages`
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String>;

    /// Reply fragments as they are produced
    ///
    /// Dropping the receiver stops the producer.
    async fn chat_stream(&self, messages: Vec<ChatMessage>) -> Result<mpsc::Receiver<Result<String>>>;

    fn model(&self) -> &str;
}
