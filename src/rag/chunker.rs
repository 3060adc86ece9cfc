//! Fixed-size overlapping text windows
//!
//! ```text
//! clean(text):   collapse every whitespace run to a single ' '
//! chunk(t, W, O):
//!   step ← W − O
//!   for start in 0, step, 2·step, … while start < len(t):
//!     emit t[start .. min(start + W, len(t))]
//! ```
//!
//! Positions count `char`s, so windows never split a UTF-8 sequence.

use crate::errors::{RagError, Result};

/// Window size and overlap, in characters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkParams {
    pub size: usize,
    pub overlap: usize,
}

impl ChunkParams {
    /// Validate `size > overlap >= 0`
    pub fn new(size: usize, overlap: usize) -> Result<Self> {
        if size == 0 || overlap >= size {
            return Err(RagError::ConfigError(format!(
                "invalid chunk window: size {} overlap {}",
                size, overlap
            )));
        }
        Ok(Self { size, overlap })
    }

    fn step(&self) -> usize {
        self.size - self.overlap
    }
}

impl Default for ChunkParams {
    fn default() -> Self {
        Self {
            size: 1000,
            overlap: 200,
        }
    }
}

/// Collapse whitespace runs to single spaces (leading/trailing kept as one space)
pub fn clean_text(text: &str) -> String {
    let mut cleaned = String::with_capacity(text.len());
    let mut in_space = false;

    for ch in text.chars() {
        if ch.is_whitespace() {
            if !in_space {
                cleaned.push(' ');
                in_space = true;
            }
        } else {
            cleaned.push(ch);
            in_space = false;
        }
    }

    cleaned
}

/// Split `text` into overlapping windows after cleaning it
pub fn chunk(text: &str, params: ChunkParams) -> Vec<String> {
    let cleaned = clean_text(text);
    let chars: Vec<char> = cleaned.chars().collect();
    let step = params.step();

    let mut chunks = Vec::with_capacity(chars.len() / step + 1);
    let mut start = 0;

    while start < chars.len() {
        let end = (start + params.size).min(chars.len());
        chunks.push(chars[start..end].iter().collect());
        start += step;
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    /// Rebuild cleaned text by dropping each chunk's leading overlap
    fn reassemble(chunks: &[String], overlap: usize) -> String {
        let mut out = String::new();
        for (i, c) in chunks.iter().enumerate() {
            if i == 0 {
                out.push_str(c);
            } else {
                out.extend(c.chars().skip(overlap));
            }
        }
        out
    }

    #[test]
    fn test_clean_collapses_whitespace() {
        assert_eq!(clean_text("a \n\t b\r\n\nc"), "a b c");
        assert_eq!(clean_text("  lead"), " lead");
    }

    #[test]
    fn test_window_positions() {
        let params = ChunkParams::new(4, 1).unwrap();
        let chunks = chunk("abcdefghij", params);
        assert_eq!(chunks, vec!["abcd", "defg", "ghij", "j"]);
    }

    #[test]
    fn test_final_chunk_shorter() {
        let params = ChunkParams::new(1000, 200).unwrap();
        let text = "x".repeat(1500);
        let chunks = chunk(&text, params);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].chars().count(), 1000);
        assert_eq!(chunks[1].chars().count(), 700);
    }

    #[test]
    fn test_empty_text() {
        assert!(chunk("", ChunkParams::default()).is_empty());
    }

    #[test]
    fn test_multibyte_safe() {
        let params = ChunkParams::new(3, 1).unwrap();
        let chunks = chunk("sécurité", params);
        assert_eq!(chunks[0], "séc");
        assert_eq!(reassemble(&chunks, 1), "sécurité");
    }

    #[test]
    fn test_invalid_params() {
        assert!(ChunkParams::new(0, 0).is_err());
        assert!(ChunkParams::new(10, 10).is_err());
        assert!(ChunkParams::new(10, 0).is_ok());
    }

    #[quickcheck]
    fn prop_chunking_is_deterministic(text: String, size: u8, overlap: u8) -> bool {
        let size = size as usize % 50 + 1;
        let overlap = overlap as usize % size;
        let params = ChunkParams::new(size, overlap).unwrap();
        chunk(&text, params) == chunk(&text, params)
    }

    #[quickcheck]
    fn prop_reassembly_restores_cleaned_text(text: String, size: u8, overlap: u8) -> bool {
        let size = size as usize % 50 + 1;
        let overlap = overlap as usize % size;
        let params = ChunkParams::new(size, overlap).unwrap();
        let chunks = chunk(&text, params);
        reassemble(&chunks, overlap) == clean_text(&text)
    }

    #[quickcheck]
    fn prop_chunks_never_exceed_window(text: String, size: u8) -> bool {
        let size = size as usize % 50 + 1;
        let params = ChunkParams::new(size, 0).unwrap();
        chunk(&text, params).iter().all(|c| c.chars().count() <= size)
    }
}
