//! Request-level merge flow.
//!
//! Uploads are validated as a whole, written to scratch files in submission
//! order, merged on the blocking pool, and the scratch files are removed on
//! every exit path. A failed merge also removes whatever the backend left at
//! the artifact path. Errors about an input name the upload's client-supplied
//! filename, never its scratch path.

use std::path::PathBuf;
use std::sync::Arc;

use super::{MergeBackend, MergeStatistics};
use crate::error::{PdfMergeError, Result};
use crate::storage::{ArtifactName, ScratchFile, ScratchStorage};
use crate::upload::Upload;
use crate::validation::UploadValidator;

/// A merged artifact ready for delivery.
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    /// Name the client uses to download the artifact.
    pub artifact: ArtifactName,

    /// Backend statistics.
    pub statistics: MergeStatistics,
}

/// Turns a batch of uploads into one merged artifact.
#[derive(Clone)]
pub struct MergeOrchestrator {
    storage: ScratchStorage,
    validator: UploadValidator,
    backend: Arc<dyn MergeBackend>,
}

impl MergeOrchestrator {
    pub fn new(
        storage: ScratchStorage,
        validator: UploadValidator,
        backend: Arc<dyn MergeBackend>,
    ) -> Self {
        Self {
            storage,
            validator,
            backend,
        }
    }

    pub fn storage(&self) -> &ScratchStorage {
        &self.storage
    }

    /// Validate, persist and merge `uploads`.
    ///
    /// Nothing is written unless every upload passes validation.
    ///
    /// # Errors
    ///
    /// Returns validation errors, storage errors, or whatever the backend
    /// reports. In every case no scratch file and no artifact remain.
    pub async fn merge_uploads(&self, uploads: Vec<Upload>) -> Result<MergeOutcome> {
        self.validator.validate(&uploads)?;

        let filenames: Vec<String> = uploads.iter().map(|u| u.filename.clone()).collect();
        let scratch = self.persist(uploads).await?;
        let inputs: Vec<PathBuf> = scratch.iter().map(|f| f.path().to_path_buf()).collect();
        let labels: Vec<(PathBuf, String)> = inputs.iter().cloned().zip(filenames).collect();

        let (artifact, output) = self.storage.allocate_artifact();
        let backend = Arc::clone(&self.backend);
        let result = tokio::task::spawn_blocking(move || backend.merge(&inputs, &output))
            .await
            .map_err(|e| PdfMergeError::merge_failed(format!("merge task failed: {e}")))
            .and_then(|merged| merged);

        drop(scratch);

        match result {
            Ok(statistics) => {
                tracing::info!(
                    %artifact,
                    files = statistics.files_merged,
                    pages = statistics.total_pages,
                    bytes = statistics.output_size,
                    elapsed_ms = statistics.merge_time.as_millis() as u64,
                    "merge complete"
                );
                Ok(MergeOutcome {
                    artifact,
                    statistics,
                })
            }
            Err(e) => {
                tracing::warn!(%artifact, error = %e, "merge failed");
                if let Err(cleanup) = self.storage.remove_artifact(&artifact).await {
                    tracing::error!(
                        %artifact,
                        error = %cleanup,
                        "failed to remove partial artifact"
                    );
                }
                Err(with_upload_name(e, &labels))
            }
        }
    }

    /// Write every upload to its own scratch file, in order.
    ///
    /// On failure the guards collected so far are dropped, removing the files
    /// already written.
    async fn persist(&self, uploads: Vec<Upload>) -> Result<Vec<ScratchFile>> {
        let mut scratch = Vec::with_capacity(uploads.len());
        for upload in uploads {
            let file = self
                .storage
                .write_scratch(&upload.filename, &upload.data)
                .await?;
            tracing::debug!(
                filename = %upload.filename,
                path = %file.path().display(),
                bytes = upload.len(),
                "persisted upload"
            );
            scratch.push(file);
        }
        Ok(scratch)
    }
}

/// Replace the scratch path in an input error with the upload's filename.
fn with_upload_name(err: PdfMergeError, labels: &[(PathBuf, String)]) -> PdfMergeError {
    let relabel = |path: PathBuf| {
        labels
            .iter()
            .find(|(scratch, _)| *scratch == path)
            .map(|(_, filename)| PathBuf::from(filename))
            .unwrap_or(path)
    };

    match err {
        PdfMergeError::FailedToLoadPdf { path, reason } => PdfMergeError::FailedToLoadPdf {
            path: relabel(path),
            reason,
        },
        PdfMergeError::CorruptedPdf { path, details } => PdfMergeError::CorruptedPdf {
            path: relabel(path),
            details,
        },
        PdfMergeError::EncryptedPdf { path } => PdfMergeError::EncryptedPdf {
            path: relabel(path),
        },
        other => other,
    }
}
