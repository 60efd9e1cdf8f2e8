//! Configuration module for pdfmerge.
//!
//! CLI arguments (see `cli`) are turned into one of the validated
//! configurations below. The storage directory is always an explicit value
//! here, never an ambient global, so tests can point each server at its own
//! isolated directory.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{PdfMergeError, Result};

/// Default address the HTTP server binds to.
pub const DEFAULT_BIND: &str = "0.0.0.0:8000";

/// Default request body limit (64 MB).
pub const DEFAULT_MAX_UPLOAD_SIZE: usize = 64 * 1024 * 1024;

/// Default age after which an undelivered artifact is swept.
pub const DEFAULT_ARTIFACT_TTL: Duration = Duration::from_secs(60 * 60);

/// Default interval between artifact sweeps.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Compression level for the merged PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionLevel {
    /// No compression - preserves exact quality and structure.
    None,
    /// Balanced compression - good trade-off between size and processing time.
    #[default]
    Standard,
    /// Maximum compression - also prunes unreferenced objects.
    Maximum,
}

impl FromStr for CompressionLevel {
    type Err = PdfMergeError;

    /// Parse compression level from "none", "standard" or "maximum".
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "standard" => Ok(Self::Standard),
            "maximum" => Ok(Self::Maximum),
            _ => Err(PdfMergeError::invalid_config(format!(
                "Invalid compression level: {s}. Must be one of: none, standard, maximum"
            ))),
        }
    }
}

/// Configuration for the HTTP server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address to listen on.
    pub bind: SocketAddr,

    /// Directory holding scratch files and merged artifacts.
    pub storage_dir: PathBuf,

    /// Maximum accepted request body size in bytes.
    pub max_upload_size: usize,

    /// Verify the leading bytes of each upload in addition to its declared type.
    pub sniff_content: bool,

    /// Compression applied to merged artifacts.
    pub compression: CompressionLevel,

    /// Age after which an undelivered artifact is deleted by the sweeper.
    pub artifact_ttl: Duration,

    /// How often the sweeper runs.
    pub sweep_interval: Duration,
}

impl ServerConfig {
    /// Create a configuration with defaults, storing files in `storage_dir`.
    pub fn with_storage_dir(storage_dir: impl Into<PathBuf>) -> Self {
        Self {
            storage_dir: storage_dir.into(),
            ..Self::default()
        }
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The upload limit is zero
    /// - The TTL or sweep interval is zero
    /// - The storage directory exists but is not a directory
    pub fn validate(&self) -> Result<()> {
        if self.max_upload_size == 0 {
            return Err(PdfMergeError::invalid_config(
                "Maximum upload size must be greater than zero",
            ));
        }

        if self.artifact_ttl.is_zero() {
            return Err(PdfMergeError::invalid_config(
                "Artifact TTL must be greater than zero",
            ));
        }

        if self.sweep_interval.is_zero() {
            return Err(PdfMergeError::invalid_config(
                "Sweep interval must be greater than zero",
            ));
        }

        if self.storage_dir.exists() && !self.storage_dir.is_dir() {
            return Err(PdfMergeError::invalid_config(format!(
                "Storage path is not a directory: {}",
                self.storage_dir.display()
            )));
        }

        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 8000)),
            storage_dir: std::env::temp_dir(),
            max_upload_size: DEFAULT_MAX_UPLOAD_SIZE,
            sniff_content: true,
            compression: CompressionLevel::Standard,
            artifact_ttl: DEFAULT_ARTIFACT_TTL,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
        }
    }
}

/// Configuration for merging a folder of PDFs from the command line.
#[derive(Debug, Clone)]
pub struct JoinConfig {
    /// Folder whose `*.pdf` files are merged.
    pub folder: PathBuf,

    /// Output file. Relative paths are resolved against `folder`.
    pub output: PathBuf,

    /// Compression applied to the output.
    pub compression: CompressionLevel,
}

impl JoinConfig {
    /// Resolve the output path against the input folder.
    pub fn output_path(&self) -> PathBuf {
        if self.output.is_absolute() {
            self.output.clone()
        } else {
            self.folder.join(&self.output)
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if !self.folder.is_dir() {
            return Err(PdfMergeError::invalid_config(format!(
                "Not a directory: {}",
                self.folder.display()
            )));
        }

        if self.output.as_os_str().is_empty() {
            return Err(PdfMergeError::invalid_config("Output path cannot be empty"));
        }

        Ok(())
    }
}
