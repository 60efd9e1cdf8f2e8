//! One-shot delivery of merged artifacts.
//!
//! Opening an artifact claims it by renaming `<uuid>.pdf` to
//! `<uuid>.pdf.delivering`, so a second request for the same name gets
//! `NotFound` even while the first download is still streaming. The claimed
//! file is deleted as soon as the stream hands out its last byte, before the
//! caller polls for the end of the stream. A stream that is dropped early
//! (client disconnect, write error) renames the file back so the download
//! can be retried.

use std::io;
use std::path::PathBuf;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::Stream;
use tokio::fs::File;
use tokio_util::io::ReaderStream;

use crate::error::{PdfMergeError, Result};
use crate::storage::{ArtifactName, ScratchStorage};

/// Opens artifacts for single-use delivery.
#[derive(Debug, Clone)]
pub struct ArtifactDelivery {
    storage: ScratchStorage,
}

impl ArtifactDelivery {
    pub fn new(storage: ScratchStorage) -> Self {
        Self { storage }
    }

    /// Claim the artifact called `name` and open it for streaming.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if `name` is not a valid artifact name, the artifact
    /// does not exist, or another request already claimed it.
    pub async fn open(&self, name: &str) -> Result<DeliveryStream> {
        let artifact: ArtifactName = name.parse()?;
        let artifact_path = self.storage.artifact_path(&artifact);
        let delivering_path = self.storage.delivering_path(&artifact);

        match tokio::fs::rename(&artifact_path, &delivering_path).await {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(PdfMergeError::not_found(name));
            }
            Err(e) => return Err(e.into()),
        }

        // From here on the claim owns the file and restores it on early drop.
        let claim = Claim {
            artifact: artifact_path,
            delivering: delivering_path,
            completed: false,
        };

        let file = File::open(&claim.delivering).await?;
        let len = file.metadata().await?.len();

        tracing::info!(%artifact, bytes = len, "delivering artifact");

        Ok(DeliveryStream {
            name: artifact,
            len,
            sent: 0,
            inner: ReaderStream::new(file),
            claim,
        })
    }
}

/// Body stream of a claimed artifact.
#[derive(Debug)]
pub struct DeliveryStream {
    name: ArtifactName,
    len: u64,
    sent: u64,
    inner: ReaderStream<File>,
    claim: Claim,
}

impl DeliveryStream {
    /// Artifact being delivered.
    pub fn name(&self) -> ArtifactName {
        self.name
    }

    /// Size of the artifact in bytes.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn finish(&mut self) {
        self.claim.complete();
        tracing::info!(artifact = %self.name, bytes = self.sent, "artifact delivered and removed");
    }
}

impl Stream for DeliveryStream {
    type Item = io::Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;
        if this.claim.completed {
            return Poll::Ready(None);
        }

        // Completion is decided by the byte count. HTTP/1 bodies with a
        // Content-Length are dropped after the last byte without a final poll.
        match Pin::new(&mut this.inner).poll_next(cx) {
            Poll::Ready(Some(Ok(chunk))) => {
                this.sent += chunk.len() as u64;
                if this.sent >= this.len {
                    this.finish();
                }
                Poll::Ready(Some(Ok(chunk)))
            }
            Poll::Ready(None) => {
                this.finish();
                Poll::Ready(None)
            }
            other => other,
        }
    }
}

#[derive(Debug)]
struct Claim {
    artifact: PathBuf,
    delivering: PathBuf,
    completed: bool,
}

// The claim settles the file synchronously: once `complete` or `drop`
// returns, the artifact is either gone or back under its original name.
// Both are single metadata operations on the storage directory.
impl Claim {
    fn complete(&mut self) {
        self.completed = true;
        if let Err(e) = std::fs::remove_file(&self.delivering) {
            tracing::warn!(
                path = %self.delivering.display(),
                error = %e,
                "failed to remove delivered artifact"
            );
        }
    }
}

impl Drop for Claim {
    fn drop(&mut self) {
        if self.completed {
            return;
        }
        match std::fs::rename(&self.delivering, &self.artifact) {
            Ok(()) => {
                tracing::info!(
                    path = %self.artifact.display(),
                    "delivery aborted, artifact restored"
                )
            }
            Err(e) => {
                tracing::warn!(
                    path = %self.delivering.display(),
                    error = %e,
                    "failed to restore artifact"
                )
            }
        }
    }
}
