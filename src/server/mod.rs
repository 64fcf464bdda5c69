//! HTTP surface over [`crate::controller::DocumentController`].
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | `POST` | `/api/documents/upload` | multipart `file` → descriptor |
//! | `GET`  | `/api/documents/{doc_id}/thumbnail/{page_num}` | page preview |
//! | `POST` | `/api/documents/{doc_id}/ocr` | `{page_ranges}` → OCR result |
//! | `GET`  | `/api/documents/{doc_id}/download/{fmt}` | `md` / `txt` attachment |
//! | `GET`  | `/health` | liveness |
//!
//! Errors are rendered as `{"error": <code>, "detail": <message>}` with a
//! status derived from [`crate::error::ErrorKind`].

mod error;
pub mod handlers;
mod router;
mod state;

pub use router::{create_router, BODY_LIMIT_BYTES};
pub use state::AppState;
