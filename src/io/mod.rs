//! PDF I/O operations.
//!
//! - [`PdfReader`]: load documents from disk with page verification
//! - [`PdfWriter`]: atomic, buffered writes of merged documents

pub mod reader;
pub mod writer;

pub use reader::{LoadedPdf, PdfReader};
pub use writer::{PdfWriter, WriteOptions, WriteStatistics};
