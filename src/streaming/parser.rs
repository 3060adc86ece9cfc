//! Incremental JSON frame decoder for streamed chat responses
//!
//! Ollama streams one JSON object per line, but network reads split and
//! merge lines arbitrarily. The decoder buffers bytes and cuts complete
//! top-level objects out by bracket matching, ignoring braces in strings.

use crate::errors::{RagError, Result};
use crate::types::ChatFrame;

/// Maximum buffer size (1MB)
pub const MAX_BUFFER_SIZE: usize = 1_048_576;

/// Byte buffer that yields complete JSON objects
#[derive(Debug)]
pub struct FrameParser {
    buffer: Vec<u8>,
    max_buffer_size: usize,
}

impl Default for FrameParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameParser {
    pub fn new() -> Self {
        Self::with_capacity(MAX_BUFFER_SIZE)
    }

    /// Parser that refuses to buffer more than `max_buffer_size` bytes
    pub fn with_capacity(max_buffer_size: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(4096),
            max_buffer_size,
        }
    }

    /// Append bytes and return the first complete object, if any
    ///
    /// Call [`FrameParser::next_object`] until it returns `None` to drain
    /// objects that arrived in the same read.
    pub fn add_bytes(&mut self, bytes: &[u8]) -> Result<Option<String>> {
        if self.buffer.len() + bytes.len() > self.max_buffer_size {
            return Err(RagError::JsonParseError(format!(
                "Buffer overflow: {} bytes exceeds maximum {}",
                self.buffer.len() + bytes.len(),
                self.max_buffer_size
            )));
        }

        self.buffer.extend_from_slice(bytes);
        self.next_object()
    }

    /// Cut the next complete object out of the buffer
    pub fn next_object(&mut self) -> Result<Option<String>> {
        if self.buffer.is_empty() {
            return Ok(None);
        }

        match self.find_complete_object()? {
            Some((start, end)) => {
                let json = String::from_utf8_lossy(&self.buffer[start..=end]).to_string();
                self.buffer.drain(..=end);
                Ok(Some(json))
            }
            None => Ok(None),
        }
    }

    /// Append bytes and decode every complete frame now available
    pub fn push(&mut self, bytes: &[u8]) -> Result<Vec<ChatFrame>> {
        let mut frames = Vec::new();
        let mut next = self.add_bytes(bytes)?;

        while let Some(json) = next {
            frames.push(Self::decode(&json)?);
            next = self.next_object()?;
        }

        Ok(frames)
    }

    /// Decode one object into a chat frame
    pub fn decode(json: &str) -> Result<ChatFrame> {
        serde_json::from_str(json)
            .map_err(|e| RagError::JsonParseError(format!("Failed to parse chat frame: {}", e)))
    }

    /// Single pass over the buffer: `(start, end)` of the first top-level object
    fn find_complete_object(&self) -> Result<Option<(usize, usize)>> {
        let mut depth: i64 = 0;
        let mut start: Option<usize> = None;
        let mut in_string = false;
        let mut escape_next = false;

        for (i, &byte) in self.buffer.iter().enumerate() {
            if escape_next {
                escape_next = false;
                continue;
            }

            match byte {
                b'\\' if in_string => escape_next = true,
                b'"' => in_string = !in_string,
                _ if in_string => {}
                b'{' => {
                    if depth == 0 {
                        start = Some(i);
                    }
                    depth += 1;
                }
                b'}' => {
                    depth -= 1;
                    if depth < 0 {
                        return Err(RagError::JsonParseError(
                            "Mismatched braces: too many closing braces".to_string(),
                        ));
                    }
                    if depth == 0 {
                        if let Some(start) = start {
                            return Ok(Some((start, i)));
                        }
                    }
                }
                _ => {}
            }
        }

        Ok(None)
    }

    /// Bytes still waiting for the rest of an object
    pub fn buffer_size(&self) -> usize {
        self.buffer.len()
    }

    /// True when only whitespace is left over
    pub fn is_drained(&self) -> bool {
        self.buffer.iter().all(|b| b.is_ascii_whitespace())
    }
}
