//! pdfmerge - merge uploaded PDF files into a single download.

use anyhow::Context;
use clap::Parser;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pdfmerge::PdfMergeError;
use pdfmerge::cli::{Cli, Command};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pdfmerge=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(err) = run(cli).await {
        eprintln!("Error: {err:#}");
        let code = err
            .downcast_ref::<PdfMergeError>()
            .map_or(1, PdfMergeError::exit_code);
        process::exit(code);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve(args) => {
            let config = args.to_config()?;
            tracing::info!("{} v{} starting", pdfmerge::NAME, pdfmerge::VERSION);
            pdfmerge::server::run(config)
                .await
                .context("server stopped with an error")?;
        }
        Command::Join(args) => {
            let config = args.to_config()?;
            let report = tokio::task::spawn_blocking(move || pdfmerge::join::join_folder(&config))
                .await
                .context("join task panicked")??;

            println!(
                "Merged {} PDFs into {} ({} pages, {}, {:.2}s)",
                report.inputs.len(),
                report.output.display(),
                report.statistics.total_pages,
                report.statistics.format_output_size(),
                report.statistics.merge_time.as_secs_f64()
            );
        }
    }

    Ok(())
}
