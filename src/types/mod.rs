//! Type definitions module
//!
//! Wire types for chat with the model.

pub mod messages;

// Re-export commonly used types
pub use messages::{ChatFrame, ChatMessage, ChatRole, FrameMessage};
