//! grcrag - retrieval-augmented assistant for GRC standards
//!
//! Indexes a directory of standards PDFs into a JSON vector store through a
//! local Ollama server, then answers questions with role-filtered context.
//!
//! # Architecture
//!
//! - **Documents**: locate PDFs, extract text
//! - **Rag**: chunk, classify, embed, store, search, assemble context
//! - **Assistant**: session-aware chat on top of retrieval
//! - **CLI**: config, logging, doctor and the `grcrag` binary

pub mod errors;
pub mod types;
pub mod roles;
pub mod retry;

// Re-export commonly used types
pub use errors::{RagError, Result};

pub mod documents;
pub mod embedding;
pub mod rag;
pub mod settings;

// Chat layer
pub mod streaming;
pub mod session;
pub mod assistant;

// Binary support
pub mod cli;
pub mod doctor;
pub mod logging;

#[cfg(test)]
mod test_support;
