//! Merge every PDF in a folder from the command line.

use std::path::{Path, PathBuf};

use crate::config::JoinConfig;
use crate::error::{PdfMergeError, Result};
use crate::merge::{LopdfMerger, MergeBackend, MergeStatistics};

/// Result of a folder join.
#[derive(Debug, Clone)]
pub struct JoinReport {
    /// Merged files, in merge order.
    pub inputs: Vec<PathBuf>,

    /// Written output file.
    pub output: PathBuf,

    pub statistics: MergeStatistics,
}

/// List the `*.pdf` files directly inside `folder`, sorted by name.
///
/// `exclude` is left out of the listing when it names an existing file, so
/// re-running a join does not merge its own previous output.
pub fn find_pdfs(folder: &Path, exclude: &Path) -> Result<Vec<PathBuf>> {
    let folder_str = folder.to_str().ok_or_else(|| {
        PdfMergeError::invalid_config(format!(
            "Folder path is not valid UTF-8: {}",
            folder.display()
        ))
    })?;
    let pattern = format!("{}/*.pdf", glob::Pattern::escape(folder_str));

    let excluded = std::fs::canonicalize(exclude).ok();

    let mut paths = Vec::new();
    for entry in glob::glob(&pattern)
        .map_err(|e| PdfMergeError::invalid_config(format!("Invalid folder pattern: {e}")))?
    {
        let path = entry.map_err(|e| PdfMergeError::from(std::io::Error::from(e)))?;
        if !path.is_file() {
            continue;
        }
        if excluded.is_some() && std::fs::canonicalize(&path).ok() == excluded {
            continue;
        }
        paths.push(path);
    }

    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(paths)
}

/// Merge the folder described by `config` into its output file.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the folder holds no
/// PDF, or any PDF cannot be loaded or the output cannot be written.
pub fn join_folder(config: &JoinConfig) -> Result<JoinReport> {
    config.validate()?;

    let output = config.output_path();
    let inputs = find_pdfs(&config.folder, &output)?;
    if inputs.is_empty() {
        return Err(PdfMergeError::insufficient_input(0, 1));
    }

    tracing::info!(
        folder = %config.folder.display(),
        files = inputs.len(),
        output = %output.display(),
        "joining folder"
    );

    let statistics = LopdfMerger::new(config.compression).merge(&inputs, &output)?;

    Ok(JoinReport {
        inputs,
        output,
        statistics,
    })
}
