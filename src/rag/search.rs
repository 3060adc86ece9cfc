//! Brute-force cosine search over the vector store
//!
//! ```text
//! cos(a, b) = (a · b) / (‖a‖ · ‖b‖)
//! ```
//!
//! Mismatched dimensions and zero-norm vectors have no defined score; such
//! entries are skipped rather than ranked with NaN.

use serde::{Deserialize, Serialize};

use crate::rag::store::{EntryMetadata, VectorEntry};
use crate::rag::topic::Topic;
use crate::roles::Role;

/// Default number of results
pub const DEFAULT_TOP_K: usize = 3;

/// Search hit with its score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredEntry {
    pub text: String,
    pub score: f32,
    pub topic: Topic,
    pub metadata: EntryMetadata,
}

/// Cosine similarity, or `None` when undefined
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f32> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (x, y) in a.iter().zip(b.iter()) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 || !denom.is_finite() {
        return None;
    }

    let score = dot / denom;
    score.is_finite().then_some(score as f32)
}

/// Rank `entries` the role may see against `query`, best first
///
/// Sorting is stable, so equal scores keep store order.
pub fn rank(entries: &[VectorEntry], query: &[f32], role: Role, k: usize) -> Vec<ScoredEntry> {
    let mut scored: Vec<ScoredEntry> = entries
        .iter()
        .filter(|e| role.allows(e.topic))
        .filter_map(|e| {
            cosine_similarity(query, &e.embedding).map(|score| ScoredEntry {
                text: e.text.clone(),
                score,
                topic: e.topic,
                metadata: e.metadata.clone(),
            })
        })
        .collect();

    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(k);
    scored
}

/// Whether any entry is visible to `role`
pub fn any_visible(entries: &[VectorEntry], role: Role) -> bool {
    entries.iter().any(|e| role.allows(e.topic))
}
