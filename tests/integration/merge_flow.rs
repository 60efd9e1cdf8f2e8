//! End-to-end merge requests through the router.

use axum::http::{StatusCode, header};

use crate::common::{Part, TestApp, body_bytes, body_json, body_text, get, page_widths, build_pdf};

#[tokio::test]
async fn test_index_serves_upload_form() {
    let app = TestApp::new();
    let response = app.send(get("/")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains(r#"<input type="file" name="files""#));
    assert!(html.contains(r#"action="/merge""#));
}

#[tokio::test]
async fn test_two_pdfs_merge_in_submission_order() {
    let app = TestApp::new();

    let name = app
        .merge(&[
            Part::pdf("a.pdf", build_pdf(&[101])),
            Part::pdf("b.pdf", build_pdf(&[202])),
        ])
        .await;

    // Only the artifact is left; scratch files are gone.
    assert_eq!(app.listing(), vec![name.clone()]);

    let response = app.send(get(&format!("/download/{name}"))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let pdf = body_bytes(response).await;
    assert_eq!(page_widths(&pdf), vec![101, 202]);
}

#[tokio::test]
async fn test_page_count_is_sum_of_inputs() {
    let app = TestApp::new();

    let name = app
        .merge(&[
            Part::pdf("one.pdf", build_pdf(&[10, 11, 12])),
            Part::pdf("two.pdf", build_pdf(&[20])),
            Part::pdf("three.pdf", build_pdf(&[30, 31])),
        ])
        .await;

    let pdf = body_bytes(app.send(get(&format!("/download/{name}"))).await).await;
    assert_eq!(page_widths(&pdf), vec![10, 11, 12, 20, 30, 31]);
}

#[tokio::test]
async fn test_declared_type_parameters_are_accepted() {
    let app = TestApp::new();

    let name = app
        .merge(&[
            Part::file("a.pdf", Some("application/pdf; name=a.pdf"), build_pdf(&[1])),
            Part::pdf("b.pdf", build_pdf(&[2])),
        ])
        .await;

    assert_eq!(app.listing(), vec![name]);
}

#[tokio::test]
async fn test_success_page_links_download() {
    let app = TestApp::new();
    let name = app
        .merge(&[
            Part::pdf("a.pdf", build_pdf(&[1])),
            Part::pdf("b.pdf", build_pdf(&[2])),
        ])
        .await;

    let response = app.send(get(&format!("/success?filename={name}"))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/html")
    );
    let html = body_text(response).await;
    assert!(html.contains(&format!(r#"href="/download/{name}""#)));
}

#[tokio::test]
async fn test_concurrent_merges_produce_distinct_artifacts() {
    let app = TestApp::new();
    let parts = || {
        [
            Part::pdf("a.pdf", build_pdf(&[1])),
            Part::pdf("b.pdf", build_pdf(&[2])),
        ]
    };

    let (first_parts, second_parts) = (parts(), parts());
    let (first, second) = tokio::join!(app.merge(&first_parts), app.merge(&second_parts));

    assert_ne!(first, second);
    let mut expected = vec![first, second];
    expected.sort();
    assert_eq!(app.listing(), expected);
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();
    let response = app.send(get("/health")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["version"], pdfmerge::VERSION);
}
