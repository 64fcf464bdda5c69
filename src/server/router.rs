use std::path::Path;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::MAX_UPLOAD_BYTES;
use crate::server::handlers::{
    download_handler, health_handler, ocr_handler, thumbnail_handler, upload_handler,
};
use crate::server::AppState;

/// Request body ceiling. Above [`MAX_UPLOAD_BYTES`] so oversized files reach
/// the upload check and get a proper validation error.
pub const BODY_LIMIT_BYTES: usize = MAX_UPLOAD_BYTES + 16 * 1024 * 1024;

/// Build the application router. When `static_dir` is set, unmatched paths
/// are served from it (the browser front end).
pub fn create_router(state: AppState, static_dir: Option<&Path>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let api = Router::new()
        .route("/documents/upload", post(upload_handler))
        .route(
            "/documents/{doc_id}/thumbnail/{page_num}",
            get(thumbnail_handler),
        )
        .route("/documents/{doc_id}/ocr", post(ocr_handler))
        .route("/documents/{doc_id}/download/{fmt}", get(download_handler));

    let mut router = Router::new()
        .route("/health", get(health_handler))
        .nest("/api", api)
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES));

    if let Some(dir) = static_dir {
        router = router.fallback_service(ServeDir::new(dir));
    }

    router.layer(trace_layer).layer(cors).with_state(state)
}
