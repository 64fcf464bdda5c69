//! Axum handlers. Each one parses the request, calls the controller, and
//! shapes the reply; all rules live in the controller.
//!
//! Extractors are taken as `Result<_, Rejection>` so parse failures go out
//! through [`DocFlowError`] with the usual JSON body.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::config::{ExportFormat, PageRange};
use crate::error::DocFlowError;
use crate::output::{DocumentDescriptor, DocumentId, OcrResult};
use crate::server::AppState;

/// Body of `POST /api/documents/{doc_id}/ocr`.
#[derive(Debug, Default, Deserialize)]
pub struct OcrRequestBody {
    #[serde(default)]
    pub page_ranges: Vec<PageRange>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy" })
}

#[tracing::instrument(skip(state, multipart))]
pub async fn upload_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<DocumentDescriptor>, DocFlowError> {
    let mut multipart = multipart?;
    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let data = field.bytes().await.map_err(malformed)?;
        tracing::info!("Received upload '{}' ({} bytes)", filename, data.len());

        let descriptor = state.controller.upload(&data, &filename).await?;
        return Ok(Json(descriptor));
    }

    Err(DocFlowError::MissingUpload)
}

#[tracing::instrument(skip(state, params))]
pub async fn thumbnail_handler(
    State(state): State<AppState>,
    params: Result<Path<(String, i64)>, PathRejection>,
) -> Result<Response, DocFlowError> {
    let Path((doc_id, page_num)) = params?;
    let id = parse_document_id(&doc_id)?;
    let thumbnail = state.controller.thumbnail(&id, page_num).await?;
    Ok(([(header::CONTENT_TYPE, thumbnail.mime)], thumbnail.bytes).into_response())
}

#[tracing::instrument(skip(state, body))]
pub async fn ocr_handler(
    State(state): State<AppState>,
    Path(doc_id): Path<String>,
    body: Result<Json<OcrRequestBody>, JsonRejection>,
) -> Result<Json<OcrResult>, DocFlowError> {
    let Json(body) = body?;
    let id = parse_document_id(&doc_id)?;
    tracing::info!("OCR requested for {} with {} ranges", id, body.page_ranges.len());
    let result = state.controller.run_ocr(&id, &body.page_ranges).await?;
    Ok(Json(result))
}

#[tracing::instrument(skip(state, params))]
pub async fn download_handler(
    State(state): State<AppState>,
    params: Result<Path<(String, String)>, PathRejection>,
) -> Result<Response, DocFlowError> {
    let Path((doc_id, fmt)) = params?;
    // Bad formats are reported as such even for unknown ids.
    fmt.parse::<ExportFormat>()?;
    let id = parse_document_id(&doc_id)?;

    let export = state.controller.download(&id, &fmt).await?;
    let headers = [
        (header::CONTENT_TYPE, export.content_type.to_string()),
        (
            header::CONTENT_DISPOSITION,
            content_disposition(&export.filename),
        ),
    ];
    Ok((headers, export.content).into_response())
}

/// Unparsable ids cannot name a registered document.
fn parse_document_id(raw: &str) -> Result<DocumentId, DocFlowError> {
    raw.parse().map_err(|_| DocFlowError::DocumentNotFound {
        doc_id: raw.to_string(),
    })
}

fn malformed(e: axum::extract::multipart::MultipartError) -> DocFlowError {
    DocFlowError::MalformedUpload {
        detail: e.body_text(),
    }
}

/// `attachment` header with an ASCII fallback and an RFC 5987 UTF-8 name.
pub fn content_disposition(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii() && !c.is_ascii_control() && c != '"' && c != '\\' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(filename)
    )
}
