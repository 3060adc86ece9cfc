//! Text extraction from documents
//!
//! `pdf-extract` is synchronous and CPU-bound, so extraction runs on the
//! blocking pool. A panic inside the parser is reported as an extraction
//! error for that file only.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::errors::{RagError, Result};

/// Turns a document on disk into one flat text stream
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, path: &Path) -> Result<String>;
}

/// PDF extractor backed by `pdf-extract`
#[derive(Debug, Clone, Default)]
pub struct PdfExtractor;

impl PdfExtractor {
    pub fn new() -> Self {
        Self
    }

    fn extract_blocking(path: &Path) -> Result<String> {
        let bytes = std::fs::read(path)?;
        pdf_extract::extract_text_from_mem(&bytes).map_err(|e| RagError::Extraction {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl TextExtractor for PdfExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let owned: PathBuf = path.to_path_buf();
        tokio::task::spawn_blocking(move || Self::extract_blocking(&owned))
            .await
            .map_err(|e| RagError::Extraction {
                path: path.to_path_buf(),
                reason: format!("parser aborted: {}", e),
            })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_corrupt_pdf_is_extraction_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("broken.pdf");
        std::fs::write(&path, b"definitely not a pdf").unwrap();

        let result = PdfExtractor::new().extract(&path).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let temp = TempDir::new().unwrap();
        let result = PdfExtractor::new().extract(&temp.path().join("gone.pdf")).await;
        assert!(matches!(result, Err(RagError::IoError(_))));
    }
}
