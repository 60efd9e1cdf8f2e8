//! Rejected requests and failed merges leave the storage directory untouched.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use rstest::rstest;

use pdfmerge::merge::{MergeBackend, MergeStatistics};
use pdfmerge::{PdfMergeError, Result};

use crate::common::{Part, TestApp, body_json, body_text, build_pdf, get, multipart_request};

/// Leaves a partial output behind and fails.
struct FailingBackend;

impl MergeBackend for FailingBackend {
    fn merge(&self, _inputs: &[PathBuf], output: &Path) -> Result<MergeStatistics> {
        std::fs::write(output, b"%PDF-1.7 half written").unwrap();
        Err(PdfMergeError::merge_failed("backend failure"))
    }
}

#[rstest]
#[case::none(vec![])]
#[case::one(vec![Part::pdf("only.pdf", build_pdf(&[1]))])]
#[tokio::test]
async fn test_fewer_than_two_files(#[case] parts: Vec<Part>) {
    let app = TestApp::new();

    let response = app.send(multipart_request("/merge", &parts)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["detail"].as_str().unwrap().contains("At least 2"));
    assert!(app.listing().is_empty());
}

#[tokio::test]
async fn test_empty_file_input_is_ignored() {
    let app = TestApp::new();

    // What a browser sends when the form is submitted without a selection.
    let response = app
        .send(multipart_request(
            "/merge",
            &[Part::file("", Some("application/octet-stream"), Vec::new())],
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(app.listing().is_empty());
}

#[tokio::test]
async fn test_non_pdf_declared_type_rejected_before_writing() {
    let app = TestApp::new();

    let response = app
        .send(multipart_request(
            "/merge",
            &[
                Part::pdf("a.pdf", build_pdf(&[1])),
                Part::file("notes.txt", Some("text/plain"), b"hello".to_vec()),
            ],
        ))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    let detail = json["detail"].as_str().unwrap();
    assert!(detail.contains("Only PDF files"));
    assert!(detail.contains("notes.txt"));
    assert!(app.listing().is_empty());
}

#[tokio::test]
async fn test_missing_content_type_rejected() {
    let app = TestApp::new();

    let response = app
        .send(multipart_request(
            "/merge",
            &[
                Part::pdf("a.pdf", build_pdf(&[1])),
                Part::file("b.pdf", None, build_pdf(&[2])),
            ],
        ))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(app.listing().is_empty());
}

#[tokio::test]
async fn test_sniffing_rejects_mislabelled_upload() {
    let app = TestApp::new();

    let response = app
        .send(multipart_request(
            "/merge",
            &[
                Part::pdf("a.pdf", build_pdf(&[1])),
                Part::pdf("fake.pdf", b"GIF89a not a pdf at all".to_vec()),
            ],
        ))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["detail"].as_str().unwrap().contains("image/gif"));
    assert!(app.listing().is_empty());
}

#[tokio::test]
async fn test_unparseable_pdf_without_sniffing_is_unprocessable() {
    let app = TestApp::with_config(|config| config.sniff_content = false);

    let response = app
        .send(multipart_request(
            "/merge",
            &[
                Part::pdf("a.pdf", build_pdf(&[1])),
                Part::pdf("fake.pdf", b"definitely not a pdf".to_vec()),
            ],
        ))
        .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(
        response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/html")
    );
    let body = body_text(response).await;
    assert!(body.contains("Error:"));
    assert!(body.contains("fake.pdf"));
    assert!(!body.contains(&*app.dir.path().to_string_lossy()));
    assert!(app.listing().is_empty());
}

#[tokio::test]
async fn test_truncated_pdf_is_unprocessable() {
    let app = TestApp::new();

    let mut truncated = build_pdf(&[1, 2]);
    truncated.truncate(truncated.len() / 3);

    let response = app
        .send(multipart_request(
            "/merge",
            &[
                Part::pdf("a.pdf", build_pdf(&[1])),
                Part::pdf("truncated.pdf", truncated),
            ],
        ))
        .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(app.listing().is_empty());
}

#[tokio::test]
async fn test_backend_failure_cleans_up() {
    let app = TestApp::with_backend(Arc::new(FailingBackend));

    let response = app
        .send(multipart_request(
            "/merge",
            &[
                Part::pdf("a.pdf", build_pdf(&[1])),
                Part::pdf("b.pdf", build_pdf(&[2])),
            ],
        ))
        .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let html = body_text(response).await;
    assert!(html.contains("An error occurred while merging the PDF files"));
    assert!(!html.contains("backend failure"));
    assert!(app.listing().is_empty());
}

#[tokio::test]
async fn test_oversized_upload_is_rejected() {
    let app = TestApp::with_config(|config| config.max_upload_size = 1024);

    let mut large = b"%PDF-1.5\n".to_vec();
    large.resize(8 * 1024, b' ');

    let response = app
        .send(multipart_request(
            "/merge",
            &[
                Part::pdf("a.pdf", large.clone()),
                Part::pdf("b.pdf", large),
            ],
        ))
        .await;

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(app.listing().is_empty());
}

#[tokio::test]
async fn test_non_multipart_request_rejected() {
    let app = TestApp::new();

    let request = Request::builder()
        .method("POST")
        .uri("/merge")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{}"))
        .unwrap();
    let response = app.send(request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["detail"].is_string());
}

#[rstest]
#[case("/success?filename=..%2Fetc%2Fpasswd")]
#[case("/success?filename=report.pdf")]
#[case("/success")]
#[tokio::test]
async fn test_success_rejects_invalid_names(#[case] uri: &str) {
    let app = TestApp::new();
    let response = app.send(get(uri)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
