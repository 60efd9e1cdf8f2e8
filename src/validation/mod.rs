//! Upload validation for pdfmerge.
//!
//! Uploads are checked before anything is written to disk:
//! - At least two files must be submitted
//! - Every file must declare the `application/pdf` media type
//! - Optionally, every file's leading bytes must be detected as PDF
//!
//! The declared content type comes from the client and proves nothing on its
//! own. Content sniffing closes that gap and is enabled by default.
//!
//! # Examples
//!
//! ```
//! use pdfmerge::upload::Upload;
//! use pdfmerge::validation::UploadValidator;
//!
//! let validator = UploadValidator::new();
//! let uploads = vec![
//!     Upload::pdf("a.pdf", b"%PDF-1.4 ...".to_vec()),
//!     Upload::pdf("b.pdf", b"%PDF-1.7 ...".to_vec()),
//! ];
//! assert!(validator.validate(&uploads).is_ok());
//! ```

use crate::error::{PdfMergeError, Result};
use crate::upload::Upload;

/// Minimum number of uploads accepted for a merge.
pub const MIN_UPLOADS: usize = 2;

/// Validator for merge submissions.
#[derive(Debug, Clone)]
pub struct UploadValidator {
    /// Minimum number of uploads.
    min_uploads: usize,

    /// Whether to inspect leading bytes in addition to the declared type.
    sniff_content: bool,
}

impl UploadValidator {
    /// Create a validator that checks declared types and sniffs content.
    pub fn new() -> Self {
        Self {
            min_uploads: MIN_UPLOADS,
            sniff_content: true,
        }
    }

    /// Create a validator that trusts the client-declared content type.
    pub fn declared_type_only() -> Self {
        Self {
            sniff_content: false,
            ..Self::new()
        }
    }

    /// Enable or disable content sniffing.
    pub fn with_sniffing(mut self, sniff_content: bool) -> Self {
        self.sniff_content = sniff_content;
        self
    }

    /// Validate an ordered sequence of uploads.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Fewer than two uploads are present
    /// - Any upload does not declare `application/pdf`
    /// - Sniffing is enabled and any upload's bytes are not a PDF
    pub fn validate(&self, uploads: &[Upload]) -> Result<()> {
        if uploads.len() < self.min_uploads {
            return Err(PdfMergeError::insufficient_input(
                uploads.len(),
                self.min_uploads,
            ));
        }

        for upload in uploads {
            self.validate_upload(upload)?;
        }

        Ok(())
    }

    /// Validate a single upload's type.
    pub fn validate_upload(&self, upload: &Upload) -> Result<()> {
        let declared = upload.content_type.as_deref().unwrap_or("");
        if !is_pdf_media_type(declared) {
            let shown = if declared.is_empty() {
                "an undeclared type"
            } else {
                declared
            };
            return Err(PdfMergeError::unsupported_type(&upload.filename, shown));
        }

        if self.sniff_content {
            match infer::get(&upload.data) {
                Some(kind) if kind.mime_type() == mime::APPLICATION_PDF.essence_str() => {}
                Some(kind) => {
                    return Err(PdfMergeError::unsupported_type(
                        &upload.filename,
                        format!("{} (detected)", kind.mime_type()),
                    ));
                }
                None => {
                    return Err(PdfMergeError::unsupported_type(
                        &upload.filename,
                        "not a PDF (detected)",
                    ));
                }
            }
        }

        Ok(())
    }
}

impl Default for UploadValidator {
    fn default() -> Self {
        Self::new()
    }
}

/// Check whether a Content-Type value names the PDF media type.
///
/// Parameters are ignored, so `application/pdf; name=a.pdf` is accepted.
pub fn is_pdf_media_type(content_type: &str) -> bool {
    content_type
        .parse::<mime::Mime>()
        .map(|m| m.essence_str() == mime::APPLICATION_PDF.essence_str())
        .unwrap_or(false)
}
