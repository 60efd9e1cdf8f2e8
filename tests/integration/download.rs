//! One-shot delivery of merged artifacts.

use axum::http::{StatusCode, header};

use pdfmerge::storage::ArtifactName;

use crate::common::{Part, TestApp, body_bytes, body_json, build_pdf, get, raw_get};

async fn merged(app: &TestApp) -> String {
    app.merge(&[
        Part::pdf("a.pdf", build_pdf(&[100])),
        Part::pdf("b.pdf", build_pdf(&[200])),
    ])
    .await
}

#[tokio::test]
async fn test_download_headers() {
    let app = TestApp::new();
    let name = merged(&app).await;

    let response = app.send(get(&format!("/download/{name}"))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        format!("attachment; filename={name}").as_str()
    );

    let declared: usize = response.headers()[header::CONTENT_LENGTH]
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    let body = body_bytes(response).await;
    assert_eq!(body.len(), declared);
    assert!(body.starts_with(b"%PDF"));
}

#[tokio::test]
async fn test_second_download_is_not_found() {
    let app = TestApp::new();
    let name = merged(&app).await;

    let first = app.send(get(&format!("/download/{name}"))).await;
    assert_eq!(first.status(), StatusCode::OK);
    body_bytes(first).await;
    assert!(app.listing().is_empty());

    let second = app.send(get(&format!("/download/{name}"))).await;
    assert_eq!(second.status(), StatusCode::NOT_FOUND);
    let json = body_json(second).await;
    assert!(json["detail"].as_str().unwrap().contains(&name));
}

#[tokio::test]
async fn test_aborted_download_restores_artifact() {
    let app = TestApp::new();
    let name = merged(&app).await;

    let response = app.send(get(&format!("/download/{name}"))).await;
    assert_eq!(response.status(), StatusCode::OK);
    drop(response);

    assert_eq!(app.listing(), vec![name.clone()]);

    let retry = app.send(get(&format!("/download/{name}"))).await;
    assert_eq!(retry.status(), StatusCode::OK);
    body_bytes(retry).await;
    assert!(app.listing().is_empty());
}

#[tokio::test]
async fn test_download_while_claimed_is_not_found() {
    let app = TestApp::new();
    let name = merged(&app).await;

    let streaming = app.send(get(&format!("/download/{name}"))).await;
    let competing = app.send(get(&format!("/download/{name}"))).await;
    assert_eq!(competing.status(), StatusCode::NOT_FOUND);

    body_bytes(streaming).await;
}

#[tokio::test]
async fn test_unknown_artifact_is_not_found() {
    let app = TestApp::new();
    let response = app
        .send(get("/download/67e55044-10b1-426f-9247-bb680e5fe0c8.pdf"))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_names_are_not_found() {
    let app = TestApp::new();
    std::fs::write(app.dir.path().join("foo.pdf"), b"%PDF-1.4 not ours").unwrap();

    for uri in [
        "/download/foo.pdf",
        "/download/..%2F..%2Fetc%2Fpasswd",
        "/download/..%2Ffoo.pdf",
    ] {
        let response = app.send(get(uri)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
    }

    assert_eq!(app.listing(), vec!["foo.pdf".to_string()]);
}

#[tokio::test]
async fn test_download_over_socket_is_single_use() {
    let app = TestApp::new();
    let name = ArtifactName::generate().to_string();
    let mut contents = b"%PDF-1.5\n".to_vec();
    contents.resize(200_000, b'x');
    std::fs::write(app.dir.path().join(&name), &contents).unwrap();

    let addr = app.serve().await;

    let first = raw_get(addr, &format!("/download/{name}")).await;
    assert_eq!(first.status, 200);
    assert_eq!(first.header("content-length"), Some("200000"));
    assert_eq!(first.body, contents);
    assert!(app.listing().is_empty());

    let second = raw_get(addr, &format!("/download/{name}")).await;
    assert_eq!(second.status, 404);
    assert!(app.listing().is_empty());
}
