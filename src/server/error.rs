use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::error::{DocFlowError, ErrorKind};

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: &'static str,
    detail: String,
}

fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Upstream => StatusCode::BAD_GATEWAY,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for DocFlowError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        match kind {
            ErrorKind::Upstream | ErrorKind::Internal => {
                tracing::error!(code = kind.code(), "Request failed: {}", self)
            }
            ErrorKind::Validation | ErrorKind::NotFound => {
                tracing::debug!(code = kind.code(), "Request rejected: {}", self)
            }
        }

        let body = ErrorResponse {
            error: kind.code(),
            detail: self.to_string(),
        };
        (status_for(kind), Json(body)).into_response()
    }
}

impl From<JsonRejection> for DocFlowError {
    fn from(rejection: JsonRejection) -> Self {
        DocFlowError::MalformedRequest {
            detail: rejection.body_text(),
        }
    }
}

impl From<PathRejection> for DocFlowError {
    fn from(rejection: PathRejection) -> Self {
        DocFlowError::MalformedRequest {
            detail: rejection.body_text(),
        }
    }
}

impl From<MultipartRejection> for DocFlowError {
    fn from(rejection: MultipartRejection) -> Self {
        DocFlowError::MalformedUpload {
            detail: rejection.body_text(),
        }
    }
}
