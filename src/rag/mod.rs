// Retrieval pipeline over the standards corpus
//
// Components:
// - Chunker: fixed-size overlapping windows
// - Topic: risk / audit / general labels per file
// - Store: JSON-backed vector collection
// - Search: role-filtered cosine top-k
// - Indexer: batch pipeline from PDFs to entries
// - Context: prompt assembly from hits
// - Engine: owns the store, runs re-index and search

pub mod chunker;
pub mod topic;
pub mod store;
pub mod search;
pub mod indexer;
pub mod context;
pub mod engine;

// Re-export key types
pub use chunker::{chunk, clean_text, ChunkParams};
pub use topic::{classify, Topic};
pub use store::{EntryMetadata, VectorEntry, VectorStore};
pub use search::{cosine_similarity, ScoredEntry, DEFAULT_TOP_K};
pub use indexer::{IndexReport, Indexer};
pub use context::{ContextBuilder, ContextConfig};
pub use engine::{EngineOptions, RagEngine};
