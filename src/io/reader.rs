//! PDF loading.
//!
//! Loading is synchronous: it is CPU-bound parsing and runs on the blocking
//! pool together with the rest of the merge.

use lopdf::Document;
use std::path::{Path, PathBuf};

use crate::error::{PdfMergeError, Result};

/// A loaded PDF document with metadata.
#[derive(Debug)]
pub struct LoadedPdf {
    /// The PDF document.
    pub document: Document,

    /// Path to the source file.
    pub path: PathBuf,

    /// Number of pages in the document.
    pub page_count: usize,

    /// File size in bytes.
    pub file_size: u64,
}

/// PDF reader that rejects encrypted documents and documents without pages.
#[derive(Debug, Clone, Default)]
pub struct PdfReader;

impl PdfReader {
    pub fn new() -> Self {
        Self
    }

    /// Load a single PDF document.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - File cannot be read or is not a valid PDF
    /// - PDF is encrypted
    /// - PDF has no pages
    pub fn load(&self, path: &Path) -> Result<LoadedPdf> {
        let path_buf = path.to_path_buf();

        let document = Document::load(&path_buf).map_err(|e| {
            let err_msg = e.to_string();
            let lowered = err_msg.to_lowercase();
            if lowered.contains("encrypt") || lowered.contains("password") {
                PdfMergeError::encrypted_pdf(path_buf.clone())
            } else {
                PdfMergeError::failed_to_load_pdf(path_buf.clone(), err_msg)
            }
        })?;

        let page_count = document.get_pages().len();
        if page_count == 0 {
            return Err(PdfMergeError::corrupted_pdf(path_buf, "PDF has no pages"));
        }

        let file_size = std::fs::metadata(&path_buf).map(|m| m.len()).unwrap_or(0);

        Ok(LoadedPdf {
            document,
            path: path_buf,
            page_count,
            file_size,
        })
    }

    /// Load PDF documents in order, stopping at the first failure.
    pub fn load_all(&self, paths: &[PathBuf]) -> Result<Vec<LoadedPdf>> {
        paths.iter().map(|path| self.load(path)).collect()
    }
}
