use axum::{
    Json,
    body::Body,
    extract::{
        Multipart, Path, Query, State,
        multipart::{MultipartError, MultipartRejection},
        rejection::QueryRejection,
    },
    http::{StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};

use super::AppState;
use super::error::AppError;
use super::pages;
use crate::error::{PdfMergeError, Result};
use crate::storage::ArtifactName;
use crate::upload::{PDF_MEDIA_TYPE, Upload};

/// Multipart field carrying the files to merge.
pub const FILES_FIELD: &str = "files";

#[derive(Debug, Deserialize)]
pub struct SuccessQuery {
    pub filename: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

pub async fn index() -> Html<&'static str> {
    Html(pages::INDEX_PAGE)
}

/// Merge the uploaded files and redirect to the success page.
pub async fn merge(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> std::result::Result<Redirect, AppError> {
    let multipart = multipart.map_err(|e| PdfMergeError::invalid_upload(e.body_text()))?;
    let uploads = read_uploads(multipart).await?;
    tracing::info!(count = uploads.len(), "received merge request");

    let outcome = state.orchestrator.merge_uploads(uploads).await?;

    Ok(Redirect::to(&format!(
        "/success?filename={}",
        outcome.artifact
    )))
}

pub async fn success(
    query: std::result::Result<Query<SuccessQuery>, QueryRejection>,
) -> std::result::Result<Html<String>, AppError> {
    let Query(query) = query.map_err(|e| PdfMergeError::invalid_upload(e.body_text()))?;
    let artifact: ArtifactName = query.filename.parse().map_err(|_| {
        PdfMergeError::invalid_upload(format!("'{}' is not a merged file name", query.filename))
    })?;

    Ok(Html(pages::success_page(&artifact)))
}

/// Stream a merged artifact once.
pub async fn download(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> std::result::Result<Response, AppError> {
    let stream = state.delivery.open(&filename).await?;

    let headers = [
        (header::CONTENT_TYPE, PDF_MEDIA_TYPE.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename={}", stream.name()),
        ),
        (header::CONTENT_LENGTH, stream.len().to_string()),
    ];

    Ok((StatusCode::OK, headers, Body::from_stream(stream)).into_response())
}

pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
    })
}

/// Collect the `files` fields in submission order.
///
/// Other fields are ignored, as is the empty part browsers send when the
/// form is submitted without selecting a file.
async fn read_uploads(mut multipart: Multipart) -> Result<Vec<Upload>> {
    let mut uploads = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILES_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.map_err(multipart_error)?;

        if filename.is_empty() && data.is_empty() {
            continue;
        }
        uploads.push(Upload::new(filename, content_type, data));
    }

    Ok(uploads)
}

fn multipart_error(err: MultipartError) -> PdfMergeError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        PdfMergeError::PayloadTooLarge
    } else {
        PdfMergeError::invalid_upload(err.body_text())
    }
}
