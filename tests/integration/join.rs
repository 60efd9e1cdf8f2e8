//! Folder joins from the command line.

use std::path::PathBuf;

use tempfile::TempDir;

use pdfmerge::PdfMergeError;
use pdfmerge::config::{CompressionLevel, JoinConfig};
use pdfmerge::join::join_folder;

use crate::common::{build_pdf, page_widths};

fn write(dir: &TempDir, name: &str, widths: &[i64]) {
    std::fs::write(dir.path().join(name), build_pdf(widths)).unwrap();
}

#[test]
fn test_join_sorted_by_name() {
    let dir = TempDir::new().unwrap();
    write(&dir, "c.pdf", &[3]);
    write(&dir, "a.pdf", &[1]);
    write(&dir, "b.pdf", &[2, 22]);
    std::fs::write(dir.path().join("readme.txt"), "ignored").unwrap();

    let report = join_folder(&JoinConfig {
        folder: dir.path().to_path_buf(),
        output: PathBuf::from("merged_output.pdf"),
        compression: CompressionLevel::None,
    })
    .unwrap();

    assert_eq!(report.output, dir.path().join("merged_output.pdf"));
    assert_eq!(report.inputs.len(), 3);
    let merged = std::fs::read(&report.output).unwrap();
    assert_eq!(page_widths(&merged), vec![1, 2, 22, 3]);
}

#[test]
fn test_join_absolute_output_outside_folder() {
    let dir = TempDir::new().unwrap();
    let out_dir = TempDir::new().unwrap();
    write(&dir, "a.pdf", &[1]);

    let output = out_dir.path().join("joined.pdf");
    let report = join_folder(&JoinConfig {
        folder: dir.path().to_path_buf(),
        output: output.clone(),
        compression: CompressionLevel::Standard,
    })
    .unwrap();

    assert_eq!(report.output, output);
    assert_eq!(page_widths(&std::fs::read(&output).unwrap()), vec![1]);
}

#[test]
fn test_join_missing_folder_is_config_error() {
    let dir = TempDir::new().unwrap();
    let err = join_folder(&JoinConfig {
        folder: dir.path().join("missing"),
        output: PathBuf::from("merged_output.pdf"),
        compression: CompressionLevel::Standard,
    })
    .unwrap_err();

    assert!(matches!(err, PdfMergeError::InvalidConfig { .. }));
    assert_eq!(err.exit_code(), 1);
}
