//! CLI argument parsing for pdfmerge.
//!
//! Two subcommands share one binary:
//!
//! - `serve` runs the HTTP front-end
//! - `join` merges every PDF in a folder into one file
//!
//! Every `serve` flag can also be set through a `PDFMERGE_*` environment
//! variable, which is how container deployments configure it.

use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::config::{
    CompressionLevel, DEFAULT_ARTIFACT_TTL, DEFAULT_BIND, DEFAULT_MAX_UPLOAD_SIZE,
    DEFAULT_SWEEP_INTERVAL, JoinConfig, ServerConfig,
};
use crate::error::Result;

/// Merge PDF files through a small web front-end.
#[derive(Parser, Debug)]
#[command(name = "pdfmerge")]
#[command(version)]
#[command(about = "Merge uploaded PDF files into a single download", long_about = None)]
#[command(author)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP server
    Serve(ServeArgs),

    /// Merge every PDF in a folder, sorted by file name
    ///
    /// Example:
    ///   pdfmerge join ./input -o merged_output.pdf
    Join(JoinArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, env = "PDFMERGE_BIND", value_name = "ADDR", default_value = DEFAULT_BIND)]
    pub bind: SocketAddr,

    /// Directory for scratch files and merged artifacts
    ///
    /// Defaults to the system temporary directory.
    #[arg(long, env = "PDFMERGE_STORAGE_DIR", value_name = "DIR")]
    pub storage_dir: Option<PathBuf>,

    /// Maximum request body size in bytes
    #[arg(long, env = "PDFMERGE_MAX_UPLOAD_SIZE", value_name = "BYTES", default_value_t = DEFAULT_MAX_UPLOAD_SIZE)]
    pub max_upload_size: usize,

    /// Trust the declared content type instead of checking the PDF header
    #[arg(long, env = "PDFMERGE_NO_SNIFF")]
    pub no_sniff: bool,

    /// Compression level for merged PDFs
    ///
    /// - none: No compression (preserves exact structure)
    /// - standard: Compress streams (default)
    /// - maximum: Also drop unreferenced objects
    #[arg(short, long, env = "PDFMERGE_COMPRESSION", value_name = "LEVEL", default_value = "standard")]
    #[arg(value_parser = ["none", "standard", "maximum"])]
    pub compression: String,

    /// Seconds an undelivered artifact is kept before it is swept
    #[arg(long, env = "PDFMERGE_ARTIFACT_TTL", value_name = "SECS", default_value_t = DEFAULT_ARTIFACT_TTL.as_secs())]
    pub artifact_ttl: u64,

    /// Seconds between artifact sweeps
    #[arg(long, env = "PDFMERGE_SWEEP_INTERVAL", value_name = "SECS", default_value_t = DEFAULT_SWEEP_INTERVAL.as_secs())]
    pub sweep_interval: u64,
}

impl ServeArgs {
    /// Convert the arguments into a validated [`ServerConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error if the compression level is unknown or the resulting
    /// configuration fails validation.
    pub fn to_config(&self) -> Result<ServerConfig> {
        let defaults = ServerConfig::default();
        let config = ServerConfig {
            bind: self.bind,
            storage_dir: self.storage_dir.clone().unwrap_or(defaults.storage_dir),
            max_upload_size: self.max_upload_size,
            sniff_content: !self.no_sniff,
            compression: CompressionLevel::from_str(&self.compression)?,
            artifact_ttl: Duration::from_secs(self.artifact_ttl),
            sweep_interval: Duration::from_secs(self.sweep_interval),
        };

        config.validate()?;
        Ok(config)
    }
}

#[derive(Args, Debug, Clone)]
pub struct JoinArgs {
    /// Folder containing the PDFs to merge
    #[arg(value_name = "FOLDER")]
    pub folder: PathBuf,

    /// Output file, relative to the folder unless absolute
    #[arg(short, long, value_name = "FILE", default_value = "merged_output.pdf")]
    pub output: PathBuf,

    /// Compression level for the output
    #[arg(short, long, value_name = "LEVEL", default_value = "standard")]
    #[arg(value_parser = ["none", "standard", "maximum"])]
    pub compression: String,
}

impl JoinArgs {
    /// Convert the arguments into a validated [`JoinConfig`].
    pub fn to_config(&self) -> Result<JoinConfig> {
        let config = JoinConfig {
            folder: self.folder.clone(),
            output: self.output.clone(),
            compression: CompressionLevel::from_str(&self.compression)?,
        };

        config.validate()?;
        Ok(config)
    }
}
