//! Recursive PDF discovery

use std::path::{Path, PathBuf};
use tracing::{debug, error, warn};
use walkdir::WalkDir;

/// All `.pdf` files (any case) under `root`, sorted by path
///
/// A missing root yields an empty list. Unreadable subdirectories are
/// logged and skipped.
pub fn find_pdf_files(root: &Path) -> Vec<PathBuf> {
    if !root.exists() {
        debug!(root = %root.display(), "document root does not exist");
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(error = %e, "skipping unreadable directory entry");
                None
            }
        })
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| is_pdf(p))
        .collect();

    files.sort();
    files
}

/// `find_pdf_files` on the blocking pool, for use from async code
pub async fn locate_pdf_files(root: &Path) -> Vec<PathBuf> {
    let root = root.to_path_buf();
    match tokio::task::spawn_blocking(move || find_pdf_files(&root)).await {
        Ok(files) => files,
        Err(e) => {
            error!(error = %e, "document walk panicked");
            Vec::new()
        }
    }
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}
