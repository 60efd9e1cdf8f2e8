use axum::{
    Json,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde_json::json;

use super::pages;
use crate::error::PdfMergeError;

/// HTTP wrapper around [`PdfMergeError`].
///
/// Request and delivery errors become JSON `{"detail": ...}` bodies. Merge
/// errors render the HTML error page: 422 when the PDF library rejected an
/// input, 500 otherwise.
#[derive(Debug)]
pub struct AppError(pub PdfMergeError);

impl From<PdfMergeError> for AppError {
    fn from(err: PdfMergeError) -> Self {
        Self(err)
    }
}

impl AppError {
    /// Status code sent for this error.
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            PdfMergeError::InsufficientInput { .. }
            | PdfMergeError::UnsupportedType { .. }
            | PdfMergeError::InvalidUpload { .. } => StatusCode::BAD_REQUEST,
            PdfMergeError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            PdfMergeError::NotFound { .. } => StatusCode::NOT_FOUND,
            PdfMergeError::FailedToLoadPdf { .. }
            | PdfMergeError::CorruptedPdf { .. }
            | PdfMergeError::EncryptedPdf { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            PdfMergeError::MergeFailed { .. }
            | PdfMergeError::FailedToWrite { .. }
            | PdfMergeError::InvalidConfig { .. }
            | PdfMergeError::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if self.0.is_client_error() {
            tracing::info!(status = %status, error = %self.0, "request rejected");
            return (status, Json(json!({ "detail": self.0.to_string() }))).into_response();
        }

        let message = if self.0.is_unmergeable_input() {
            tracing::warn!(error = %self.0, "uploaded file could not be merged");
            self.0.to_string()
        } else {
            tracing::error!(error = ?self.0, "merge failed");
            "An error occurred while merging the PDF files".to_string()
        };

        (status, Html(pages::error_page(&message))).into_response()
    }
}
