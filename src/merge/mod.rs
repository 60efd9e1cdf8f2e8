//! PDF merging.
//!
//! [`MergeBackend`] is the seam between the request orchestration and the
//! PDF library. [`LopdfMerger`] is the production backend; tests swap in
//! backends that fail on purpose to exercise cleanup paths.

pub mod merger;
pub mod orchestrator;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;

use crate::error::Result;

pub use merger::LopdfMerger;
pub use orchestrator::{MergeOrchestrator, MergeOutcome};

/// Merges an ordered list of PDF files into one output file.
pub trait MergeBackend: Send + Sync {
    /// Concatenate `inputs`, in order, into a new PDF at `output`.
    ///
    /// Implementations must not leave a partial file at `output` when they
    /// return an error.
    fn merge(&self, inputs: &[PathBuf], output: &Path) -> Result<MergeStatistics>;
}

/// Summary of a finished merge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergeStatistics {
    /// Number of input files.
    pub files_merged: usize,

    /// Pages in the merged document.
    pub total_pages: usize,

    /// Combined size of the inputs in bytes.
    pub input_size: u64,

    /// Size of the merged file in bytes.
    pub output_size: u64,

    /// Wall time spent loading, merging and writing.
    pub merge_time: Duration,
}

impl MergeStatistics {
    /// Output size as a human-readable string.
    pub fn format_output_size(&self) -> String {
        crate::utils::format_file_size(self.output_size)
    }
}
