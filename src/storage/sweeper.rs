//! Background removal of stale files from the storage directory.
//!
//! Artifacts that are never downloaded, and files orphaned by a crash, are
//! deleted once they are older than the configured TTL. Only names this crate
//! generates are considered, since the storage directory may be shared (the
//! default is the system temp directory).
//!
//! A claimed `.delivering` file keeps the modification time of the artifact
//! it was renamed from, so it may belong to a download that is still
//! streaming. It is only swept once it is older than twice the TTL.

use std::time::{Duration, SystemTime};

use tokio::sync::watch;
use uuid::Uuid;

use super::{ARTIFACT_EXTENSION, DELIVERING_SUFFIX, ScratchStorage};
use crate::error::Result;

/// Outcome of one sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Files inspected that matched a generated name.
    pub candidates: usize,
    /// Files deleted.
    pub removed: usize,
}

/// Kinds of file this crate writes into the storage directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ManagedFile {
    Artifact,
    Delivering,
    PartialWrite,
    Scratch,
}

impl ManagedFile {
    /// Age at which a file of this kind counts as stale.
    fn stale_after(self, ttl: Duration) -> Duration {
        match self {
            Self::Delivering => ttl.saturating_mul(2),
            _ => ttl,
        }
    }
}

fn classify(file_name: &str) -> Option<ManagedFile> {
    let (prefix, rest) = file_name.split_at_checked(36)?;
    Uuid::try_parse(prefix).ok()?;

    let artifact_suffix = format!(".{ARTIFACT_EXTENSION}");
    if rest == artifact_suffix {
        Some(ManagedFile::Artifact)
    } else if rest == format!("{artifact_suffix}{DELIVERING_SUFFIX}") {
        Some(ManagedFile::Delivering)
    } else if rest == ".tmp" {
        Some(ManagedFile::PartialWrite)
    } else if rest.starts_with('-') && rest.len() > 1 {
        Some(ManagedFile::Scratch)
    } else {
        None
    }
}

/// Delete managed files whose modification time is older than `ttl`
/// (twice `ttl` for claimed downloads).
///
/// # Errors
///
/// Returns an error only if the storage directory cannot be listed. Files
/// that disappear or cannot be removed mid-sweep are skipped.
pub async fn sweep_once(storage: &ScratchStorage, ttl: Duration) -> Result<SweepReport> {
    let mut report = SweepReport::default();
    let now = SystemTime::now();

    let mut entries = tokio::fs::read_dir(storage.root()).await?;
    while let Some(entry) = entries.next_entry().await? {
        let file_name = entry.file_name();
        let Some(kind) = file_name.to_str().and_then(classify) else {
            continue;
        };

        let Ok(metadata) = entry.metadata().await else {
            continue;
        };
        if !metadata.is_file() {
            continue;
        }
        report.candidates += 1;

        let age = metadata
            .modified()
            .ok()
            .and_then(|modified| now.duration_since(modified).ok())
            .unwrap_or(Duration::ZERO);
        if age < kind.stale_after(ttl) {
            continue;
        }

        match tokio::fs::remove_file(entry.path()).await {
            Ok(()) => {
                report.removed += 1;
                tracing::info!(
                    file = ?file_name,
                    ?kind,
                    age_secs = age.as_secs(),
                    "swept stale file"
                );
            }
            Err(e) => {
                tracing::warn!(file = ?file_name, error = %e, "failed to sweep stale file");
            }
        }
    }

    Ok(report)
}

/// Run [`sweep_once`] every `interval` until `shutdown` flips to true.
pub async fn run(
    storage: ScratchStorage,
    ttl: Duration,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match sweep_once(&storage, ttl).await {
                    Ok(report) if report.removed > 0 => {
                        tracing::info!(
                            removed = report.removed,
                            candidates = report.candidates,
                            "artifact sweep finished"
                        );
                    }
                    Ok(_) => {}
                    Err(e) => tracing::error!(error = %e, "artifact sweep failed"),
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    tracing::debug!("artifact sweeper stopping");
                    break;
                }
            }
        }
    }
}
