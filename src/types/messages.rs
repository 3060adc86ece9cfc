//! Message types for chat with the model
//!
//! Mirrors the Ollama `/api/chat` wire format.

use serde::{Deserialize, Serialize};

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// One turn of a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// One object of a chat response, streamed or not
///
/// Streamed bodies carry many of these, each with a content fragment; the
/// last one has `done: true`. Errors arrive as `{"error": "..."}`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ChatFrame {
    #[serde(default)]
    pub message: Option<FrameMessage>,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub error: Option<String>,
}

/// Message body inside a frame
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FrameMessage {
    #[serde(default)]
    pub content: String,
}

impl ChatFrame {
    /// Content fragment, empty if the frame carries none
    pub fn content(&self) -> &str {
        self.message.as_ref().map(|m| m.content.as_str()).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_serialization() {
        let json = serde_json::to_string(&ChatMessage::user("Quels contrôles ISO 27002 ?")).unwrap();
        assert_eq!(json, r#"{"role":"user","content":"Quels contrôles ISO 27002 ?"}"#);
    }

    #[test]
    fn test_frame_with_content() {
        let frame: ChatFrame = serde_json::from_str(
            r#"{"model":"llama3","message":{"role":"assistant","content":"Hel"},"done":false}"#,
        )
        .unwrap();
        assert_eq!(frame.content(), "Hel");
        assert!(!frame.done);
    }

    #[test]
    fn test_final_frame_without_message() {
        let frame: ChatFrame = serde_json::from_str(r#"{"done":true,"total_duration":12}"#).unwrap();
        assert!(frame.done);
        assert_eq!(frame.content(), "");
    }

    #[test]
    fn test_error_frame() {
        let frame: ChatFrame = serde_json::from_str(r#"{"error":"model not loaded"}"#).unwrap();
        assert_eq!(frame.error.as_deref(), Some("model not loaded"));
    }
}
