//! OCR: send an encoded file to the provider and assemble the result.
//!
//! The provider sits behind [`OcrEngine`] so the lifecycle can be exercised
//! without network access. [`MistralOcrClient`] is the production engine: a
//! single `POST` to the Mistral OCR endpoint, no retry. The API key is looked
//! up on every call, so a missing key fails OCR requests only, never startup.

use crate::config::ServiceConfig;
use crate::error::DocFlowError;
use crate::output::OcrResult;
use crate::pipeline::encode::{self, OcrDocument};
use crate::pipeline::postprocess;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Body of an OCR request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcrRequest {
    pub model: String,
    pub document: OcrDocument,
    pub include_image_base64: bool,
}

/// One recognised page as returned by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcrPage {
    #[serde(default)]
    pub index: usize,
    #[serde(default)]
    pub markdown: String,
}

#[derive(Debug, Deserialize)]
struct OcrResponse {
    pages: Vec<OcrPage>,
}

/// A hosted OCR service.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Recognise every page of `request.document`, in document order.
    async fn process(&self, request: &OcrRequest) -> Result<Vec<OcrPage>, DocFlowError>;
}

/// Run OCR over the file at `path` and build Markdown and plain text.
pub async fn run_ocr(
    engine: &dyn OcrEngine,
    model: &str,
    path: &Path,
) -> Result<OcrResult, DocFlowError> {
    let start = Instant::now();
    let document = encode::encode_file(path).await?;
    let request = OcrRequest {
        model: model.to_string(),
        document,
        include_image_base64: false,
    };

    let pages = engine.process(&request).await?;
    let markdown: Vec<&str> = pages.iter().map(|p| p.markdown.as_str()).collect();
    let result = postprocess::assemble(&markdown);

    info!(
        "OCR complete: {} pages from {} in {}ms",
        result.pages_processed,
        path.display(),
        start.elapsed().as_millis()
    );
    Ok(result)
}

/// [`OcrEngine`] for the Mistral OCR API.
#[derive(Debug, Clone)]
pub struct MistralOcrClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    api_key_env: String,
}

impl MistralOcrClient {
    pub fn new(config: &ServiceConfig) -> Result<Self, DocFlowError> {
        let http = reqwest::Client::builder()
            .timeout(config.api_timeout())
            .build()
            .map_err(|e| DocFlowError::Internal(format!("HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoint: config.ocr_endpoint.clone(),
            api_key: config.api_key.clone(),
            api_key_env: config.api_key_env.clone(),
        })
    }

    fn resolve_api_key(&self) -> Result<String, DocFlowError> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| DocFlowError::OcrNotConfigured {
                env_var: self.api_key_env.clone(),
            })
    }
}

#[async_trait]
impl OcrEngine for MistralOcrClient {
    async fn process(&self, request: &OcrRequest) -> Result<Vec<OcrPage>, DocFlowError> {
        let api_key = self.resolve_api_key()?;
        debug!(
            "POST {} model={} image={}",
            self.endpoint,
            request.model,
            request.document.is_image()
        );

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                let message = if e.is_timeout() {
                    format!("request timed out: {e}")
                } else {
                    format!("request failed: {e}")
                };
                DocFlowError::OcrApiError { message }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("OCR provider returned {}: {}", status, body);
            return Err(DocFlowError::OcrApiError {
                message: format!("HTTP {status}: {body}"),
            });
        }

        let parsed: OcrResponse =
            response
                .json()
                .await
                .map_err(|e| DocFlowError::OcrApiError {
                    message: format!("unreadable response: {e}"),
                })?;

        Ok(parsed.pages)
    }
}
