use lopdf::{Document, Object, ObjectId};
use std::path::{Path, PathBuf};
use std::time::Instant;

use super::{MergeBackend, MergeStatistics};
use crate::config::CompressionLevel;
use crate::error::{PdfMergeError, Result};
use crate::io::{LoadedPdf, PdfReader, PdfWriter};

/// Merge backend built on lopdf object renumbering.
///
/// Every document after the first is renumbered past the highest object id
/// merged so far, its objects are moved into the first document, and its
/// pages are appended to the first document's root `Pages` node.
#[derive(Debug, Clone, Default)]
pub struct LopdfMerger {
    compression: CompressionLevel,
    reader: PdfReader,
    writer: PdfWriter,
}

impl LopdfMerger {
    /// Create a merger with the given compression level.
    pub fn new(compression: CompressionLevel) -> Self {
        Self {
            compression,
            ..Default::default()
        }
    }

    /// Merge loaded documents into one, in order.
    ///
    /// # Errors
    ///
    /// Returns an error if `documents` is empty or the first document has no
    /// usable page tree.
    pub fn merge_documents(&self, documents: Vec<LoadedPdf>) -> Result<Document> {
        let mut documents = documents.into_iter();
        let first = documents
            .next()
            .ok_or_else(|| PdfMergeError::insufficient_input(0, 1))?;

        let mut merged = first.document;
        let mut max_id = merged.max_id;

        for loaded in documents {
            let mut doc = loaded.document;

            doc.renumber_objects_with(max_id + 1);
            max_id = doc.max_id;

            let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();
            tracing::debug!(
                path = %loaded.path.display(),
                pages = loaded.page_count,
                "appending document"
            );

            merged.objects.extend(doc.objects);
            append_pages_to_page_tree(&mut merged, page_ids)?;
        }
        merged.max_id = max_id;

        if self.compression == CompressionLevel::Maximum {
            merged.prune_objects();
        }
        merged.renumber_objects();
        if self.compression != CompressionLevel::None {
            merged.compress();
        }

        Ok(merged)
    }
}

impl MergeBackend for LopdfMerger {
    fn merge(&self, inputs: &[PathBuf], output: &Path) -> Result<MergeStatistics> {
        let start = Instant::now();

        let documents = self.reader.load_all(inputs)?;
        let files_merged = documents.len();
        let input_size = documents.iter().map(|d| d.file_size).sum();

        let mut merged = self.merge_documents(documents)?;
        let total_pages = merged.get_pages().len();

        let written = self.writer.save(&mut merged, output)?;

        Ok(MergeStatistics {
            files_merged,
            total_pages,
            input_size,
            output_size: written.file_size,
            merge_time: start.elapsed(),
        })
    }
}

/// Append page references to the merged document's root `Pages` node.
///
/// Appended pages keep their original `Parent`, so attributes they inherit
/// from their old page tree (`MediaBox`, `Resources`, `Rotate`) still resolve.
fn append_pages_to_page_tree(merged: &mut Document, page_ids: Vec<ObjectId>) -> Result<()> {
    let added = page_ids.len() as i64;
    let pages_id = merged.catalog()?.get(b"Pages")?.as_reference()?;
    let pages_dict = merged.get_object_mut(pages_id)?.as_dict_mut()?;

    let kids = pages_dict.get_mut(b"Kids")?.as_array_mut()?;
    kids.extend(page_ids.into_iter().map(Object::Reference));

    let count = pages_dict.get(b"Count")?.as_i64()?;
    pages_dict.set("Count", Object::Integer(count + added));

    Ok(())
}
