//! Uploaded files as received from a multipart request.

use bytes::Bytes;

/// The PDF media type.
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// One uploaded file, held in memory until it is persisted to scratch storage.
#[derive(Debug, Clone)]
pub struct Upload {
    /// Client-supplied filename.
    pub filename: String,

    /// Content type declared by the client, if any.
    pub content_type: Option<String>,

    /// Full file contents.
    pub data: Bytes,
}

impl Upload {
    /// Create a new upload.
    pub fn new(
        filename: impl Into<String>,
        content_type: Option<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type,
            data: data.into(),
        }
    }

    /// Create an upload declared as `application/pdf`.
    pub fn pdf(filename: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self::new(filename, Some(PDF_MEDIA_TYPE.to_string()), data)
    }

    /// Size of the upload in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the upload has no content.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
