// Chat sessions
//
// Conversation history per session id, bounded in length and forgotten
// after a period of inactivity.

pub mod sessions;

pub use sessions::{ChatSessions, DEFAULT_MAX_MESSAGES, DEFAULT_TTL};
