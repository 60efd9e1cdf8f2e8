//! Error types for pdfmerge.
//!
//! Every fallible operation in the library returns [`PdfMergeError`]. The
//! variants fall into four groups:
//!
//! - **Input errors**: too few uploads, non-PDF uploads, malformed requests
//! - **PDF errors**: inputs the PDF library refuses to load
//! - **Storage errors**: scratch or artifact files that cannot be written
//! - **Delivery errors**: artifacts that are missing or already consumed
//!
//! The HTTP mapping lives in `server::error`; the CLI uses [`PdfMergeError::exit_code`].

use std::io;
use std::path::PathBuf;

/// Result type alias for pdfmerge operations.
pub type Result<T> = std::result::Result<T, PdfMergeError>;

/// Main error type for pdfmerge operations.
#[derive(Debug, thiserror::Error)]
pub enum PdfMergeError {
    /// Fewer than the minimum number of uploads were submitted.
    #[error("At least {required} PDF files are required for merging (got {count})")]
    InsufficientInput {
        /// Number of uploads received.
        count: usize,
        /// Minimum number of uploads accepted.
        required: usize,
    },

    /// An upload is not a PDF, either by declared or detected type.
    #[error("Only PDF files are allowed: '{filename}' is {content_type}")]
    UnsupportedType {
        /// Client-supplied filename of the rejected upload.
        filename: String,
        /// Declared or detected content type.
        content_type: String,
    },

    /// The multipart request could not be read.
    #[error("Invalid upload: {reason}")]
    InvalidUpload {
        /// What was wrong with the request.
        reason: String,
    },

    /// The request body exceeded the configured upload limit.
    #[error("Upload exceeds the maximum allowed size")]
    PayloadTooLarge,

    /// Failed to load a PDF file.
    #[error("Failed to load PDF: {}\n  Reason: {reason}", path.display())]
    FailedToLoadPdf {
        /// Path to the PDF file.
        path: PathBuf,
        /// Reason for the failure.
        reason: String,
    },

    /// PDF file loaded but has an unusable structure.
    #[error("Corrupted or invalid PDF: {}\n  Details: {details}", path.display())]
    CorruptedPdf {
        /// Path to the corrupted PDF.
        path: PathBuf,
        /// Details about the corruption.
        details: String,
    },

    /// PDF file is encrypted and cannot be processed.
    #[error(
        "PDF is encrypted and cannot be processed: {}\n  \
         Hint: Decrypt the PDF first using 'qpdf --decrypt' or similar tools",
        path.display()
    )]
    EncryptedPdf {
        /// Path to the encrypted PDF.
        path: PathBuf,
    },

    /// Merge operation failed.
    #[error("Merge operation failed: {reason}")]
    MergeFailed {
        /// Description of what went wrong.
        reason: String,
    },

    /// Failed to write a scratch file or the merged output.
    #[error("Failed to write file: {}\n  Reason: {source}", path.display())]
    FailedToWrite {
        /// Path being written to.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Requested artifact does not exist or was already delivered.
    #[error("File not found: {name}")]
    NotFound {
        /// Artifact reference that was requested.
        name: String,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of what's wrong with the configuration.
        message: String,
    },

    /// Generic I/O error.
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error.
        #[from]
        source: io::Error,
    },
}

impl From<lopdf::Error> for PdfMergeError {
    fn from(err: lopdf::Error) -> Self {
        Self::merge_failed(err.to_string())
    }
}

impl PdfMergeError {
    /// Create an InsufficientInput error.
    pub fn insufficient_input(count: usize, required: usize) -> Self {
        Self::InsufficientInput { count, required }
    }

    /// Create an UnsupportedType error.
    pub fn unsupported_type(filename: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self::UnsupportedType {
            filename: filename.into(),
            content_type: content_type.into(),
        }
    }

    /// Create an InvalidUpload error.
    pub fn invalid_upload(reason: impl Into<String>) -> Self {
        Self::InvalidUpload {
            reason: reason.into(),
        }
    }

    /// Create a FailedToLoadPdf error.
    pub fn failed_to_load_pdf(path: PathBuf, reason: impl Into<String>) -> Self {
        Self::FailedToLoadPdf {
            path,
            reason: reason.into(),
        }
    }

    /// Create a CorruptedPdf error.
    pub fn corrupted_pdf(path: PathBuf, details: impl Into<String>) -> Self {
        Self::CorruptedPdf {
            path,
            details: details.into(),
        }
    }

    /// Create an EncryptedPdf error.
    pub fn encrypted_pdf(path: PathBuf) -> Self {
        Self::EncryptedPdf { path }
    }

    /// Create a MergeFailed error.
    pub fn merge_failed(reason: impl Into<String>) -> Self {
        Self::MergeFailed {
            reason: reason.into(),
        }
    }

    /// Create a NotFound error.
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Check if this error was caused by the client's input rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InsufficientInput { .. }
                | Self::UnsupportedType { .. }
                | Self::InvalidUpload { .. }
                | Self::PayloadTooLarge
                | Self::NotFound { .. }
        )
    }

    /// Check if the PDF library rejected one of the inputs.
    pub fn is_unmergeable_input(&self) -> bool {
        matches!(
            self,
            Self::FailedToLoadPdf { .. } | Self::CorruptedPdf { .. } | Self::EncryptedPdf { .. }
        )
    }

    /// Get the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InsufficientInput { .. } => 1,
            Self::UnsupportedType { .. } => 1,
            Self::InvalidUpload { .. } => 1,
            Self::PayloadTooLarge => 1,
            Self::InvalidConfig { .. } => 1,
            Self::NotFound { .. } => 2,
            Self::FailedToLoadPdf { .. } => 3,
            Self::CorruptedPdf { .. } => 3,
            Self::EncryptedPdf { .. } => 3,
            Self::FailedToWrite { .. } => 5,
            Self::Io { .. } => 5,
            Self::MergeFailed { .. } => 6,
        }
    }
}
