//! pdfmerge - merge uploaded PDF files into a single download.
//!
//! The crate is the orchestration around a PDF library: uploads are
//! validated, written to scratch files, merged by a [`merge::MergeBackend`]
//! and handed back exactly once through [`delivery::ArtifactDelivery`].
//! Scratch files never outlive the request that created them.
//!
//! # Example
//!
//! ```no_run
//! use pdfmerge::config::ServerConfig;
//!
//! # async fn run() -> pdfmerge::Result<()> {
//! let config = ServerConfig::with_storage_dir("/var/tmp/pdfmerge");
//! config.validate()?;
//! pdfmerge::server::run(config).await
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod delivery;
pub mod error;
pub mod io;
pub mod join;
pub mod merge;
pub mod server;
pub mod storage;
pub mod upload;
pub(crate) mod utils;
pub mod validation;

pub use error::{PdfMergeError, Result};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
