//! Temporary storage for scratch files and merged artifacts.
//!
//! All files live directly inside one storage directory that is passed in
//! through configuration. Names are generated from UUID v4 values, so
//! concurrent requests never collide and no locking is needed:
//!
//! - scratch files: `<uuid>-<sanitized upload name>`
//! - merged artifacts: `<uuid>.pdf`
//! - artifacts being delivered: `<uuid>.pdf.delivering`
//!
//! Scratch files are owned by a [`ScratchFile`] guard that deletes the file
//! when dropped, whatever path the merge took.

pub mod sweeper;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::error::{PdfMergeError, Result};

/// File extension of merged artifacts.
pub const ARTIFACT_EXTENSION: &str = "pdf";

/// Suffix appended to an artifact while it is being delivered.
pub const DELIVERING_SUFFIX: &str = ".delivering";

/// Maximum length kept from a client-supplied filename.
const MAX_NAME_LEN: usize = 64;

/// Name of a merged artifact, always `<uuid>.pdf`.
///
/// Parsing rejects anything else, which keeps client-supplied references
/// from addressing scratch files or paths outside the storage directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArtifactName(Uuid);

impl ArtifactName {
    /// Generate a fresh artifact name.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// File name of the artifact while it is being delivered.
    pub fn delivering_file_name(&self) -> String {
        format!("{self}{DELIVERING_SUFFIX}")
    }
}

impl fmt::Display for ArtifactName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.0.hyphenated(), ARTIFACT_EXTENSION)
    }
}

impl FromStr for ArtifactName {
    type Err = PdfMergeError;

    fn from_str(s: &str) -> Result<Self> {
        let stem = s
            .strip_suffix(ARTIFACT_EXTENSION)
            .and_then(|rest| rest.strip_suffix('.'))
            .ok_or_else(|| PdfMergeError::not_found(s))?;

        // Only the canonical hyphenated form round-trips through Display.
        if stem.len() != 36 {
            return Err(PdfMergeError::not_found(s));
        }

        Uuid::parse_str(stem)
            .map(Self)
            .map_err(|_| PdfMergeError::not_found(s))
    }
}

/// A scratch file holding one upload's bytes.
///
/// The file is removed when the guard is dropped.
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    /// Path of the scratch file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

// Removal is synchronous so the file is gone when the guard goes out of
// scope. It is one unlink, dropped after the merge has left the runtime.
impl Drop for ScratchFile {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "removed scratch file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "failed to remove scratch file"
                )
            }
        }
    }
}

/// Storage manager rooted at one directory.
#[derive(Debug, Clone)]
pub struct ScratchStorage {
    root: PathBuf,
}

impl ScratchStorage {
    /// Create a storage manager rooted at `root`.
    ///
    /// The directory is created lazily by [`ScratchStorage::ensure_root`].
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The storage directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the storage directory if it does not exist.
    pub async fn ensure_root(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| PdfMergeError::FailedToWrite {
                path: self.root.clone(),
                source: e,
            })
    }

    /// Write `data` to a new, uniquely named scratch file.
    ///
    /// If the write fails the partially written file is removed before the
    /// error is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written.
    pub async fn write_scratch(&self, original_name: &str, data: &[u8]) -> Result<ScratchFile> {
        let name = format!("{}-{}", Uuid::new_v4(), sanitize_file_name(original_name));
        let scratch = ScratchFile {
            path: self.root.join(name),
        };

        let write = async {
            let mut file = tokio::fs::File::create(scratch.path()).await?;
            file.write_all(data).await?;
            file.flush().await
        };

        write.await.map_err(|e| PdfMergeError::FailedToWrite {
            path: scratch.path().to_path_buf(),
            source: e,
        })?;

        Ok(scratch)
    }

    /// Allocate a fresh artifact name and its path. Nothing is created.
    pub fn allocate_artifact(&self) -> (ArtifactName, PathBuf) {
        let name = ArtifactName::generate();
        let path = self.artifact_path(&name);
        (name, path)
    }

    /// Path of an artifact.
    pub fn artifact_path(&self, name: &ArtifactName) -> PathBuf {
        self.root.join(name.to_string())
    }

    /// Path of an artifact while it is being delivered.
    pub fn delivering_path(&self, name: &ArtifactName) -> PathBuf {
        self.root.join(name.delivering_file_name())
    }

    /// Check whether an artifact is waiting for delivery.
    pub async fn artifact_exists(&self, name: &ArtifactName) -> bool {
        tokio::fs::metadata(self.artifact_path(name))
            .await
            .map(|m| m.is_file())
            .unwrap_or(false)
    }

    /// Remove an artifact if it exists.
    pub async fn remove_artifact(&self, name: &ArtifactName) -> Result<()> {
        match tokio::fs::remove_file(self.artifact_path(name)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Reduce a client-supplied filename to a safe file name component.
///
/// Directory parts are dropped and anything outside `[A-Za-z0-9._-]` becomes
/// `_`. An empty result becomes `upload.pdf`.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or("");

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .take(MAX_NAME_LEN)
        .collect();

    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload.pdf".to_string()
    } else {
        cleaned.to_string()
    }
}
