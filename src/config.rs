//! Configuration types for the docflow service.
//!
//! All service behaviour is controlled through [`ServiceConfig`], built via
//! its [`ServiceConfigBuilder`]. The binary maps CLI flags and environment
//! variables onto the builder; tests construct configs directly with a
//! throwaway scratch directory.

use crate::error::DocFlowError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Hard ceiling on upload size, checked after the body has been read.
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Default thumbnail down-scale factor relative to the native page size.
pub const DEFAULT_THUMBNAIL_SCALE: f32 = 0.4;

/// Default Mistral OCR model.
pub const DEFAULT_OCR_MODEL: &str = "mistral-ocr-2512";

/// Default Mistral OCR endpoint.
pub const DEFAULT_OCR_ENDPOINT: &str = "https://api.mistral.ai/v1/ocr";

/// Environment variable holding the OCR credential.
pub const DEFAULT_API_KEY_ENV: &str = "MISTRAL_API_KEY";

/// Configuration for the document service.
///
/// # Example
/// ```rust
/// use docflow::ServiceConfig;
///
/// let config = ServiceConfig::builder()
///     .scratch_dir("/tmp/docflow")
///     .thumbnail_scale(0.5)
///     .build()
///     .unwrap();
/// assert_eq!(config.ocr_model, "mistral-ocr-2512");
/// ```
#[derive(Clone)]
pub struct ServiceConfig {
    /// Directory holding uploaded originals, split intermediates and exports.
    /// Created on startup if missing. Default: `temp`.
    pub scratch_dir: PathBuf,

    /// Thumbnail scale relative to the native page size. Range: (0, 4]. Default: 0.4.
    pub thumbnail_scale: f32,

    /// OCR model identifier sent with every request. Default: `mistral-ocr-2512`.
    pub ocr_model: String,

    /// Full URL of the OCR endpoint.
    pub ocr_endpoint: String,

    /// Explicit API key. When `None` the key is read from `api_key_env` at
    /// the moment of each OCR call, so a missing key only fails OCR requests.
    pub api_key: Option<String>,

    /// Name of the environment variable consulted when `api_key` is unset.
    pub api_key_env: String,

    /// Timeout for a single OCR HTTP call in seconds. Default: 120.
    pub api_timeout_secs: u64,

    /// Directory (or full path) of an existing libpdfium. When unset, the
    /// working directory and then the system library path are tried.
    pub pdfium_lib_path: Option<PathBuf>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            scratch_dir: PathBuf::from("temp"),
            thumbnail_scale: DEFAULT_THUMBNAIL_SCALE,
            ocr_model: DEFAULT_OCR_MODEL.to_string(),
            ocr_endpoint: DEFAULT_OCR_ENDPOINT.to_string(),
            api_key: None,
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            api_timeout_secs: 120,
            pdfium_lib_path: None,
        }
    }
}

impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("scratch_dir", &self.scratch_dir)
            .field("thumbnail_scale", &self.thumbnail_scale)
            .field("ocr_model", &self.ocr_model)
            .field("ocr_endpoint", &self.ocr_endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_key_env", &self.api_key_env)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("pdfium_lib_path", &self.pdfium_lib_path)
            .finish()
    }
}

impl ServiceConfig {
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder {
            config: Self::default(),
        }
    }

    pub fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.api_timeout_secs)
    }
}

/// Builder for [`ServiceConfig`].
#[derive(Debug)]
pub struct ServiceConfigBuilder {
    config: ServiceConfig,
}

impl ServiceConfigBuilder {
    pub fn scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.scratch_dir = dir.into();
        self
    }

    pub fn thumbnail_scale(mut self, scale: f32) -> Self {
        self.config.thumbnail_scale = scale;
        self
    }

    pub fn ocr_model(mut self, model: impl Into<String>) -> Self {
        self.config.ocr_model = model.into();
        self
    }

    pub fn ocr_endpoint(mut self, url: impl Into<String>) -> Self {
        self.config.ocr_endpoint = url.into();
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn api_key_env(mut self, var: impl Into<String>) -> Self {
        self.config.api_key_env = var.into();
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn pdfium_lib_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_lib_path = Some(path.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ServiceConfig, DocFlowError> {
        let c = &self.config;
        if !(c.thumbnail_scale > 0.0 && c.thumbnail_scale <= 4.0) {
            return Err(DocFlowError::InvalidConfig(format!(
                "thumbnail scale must be in (0, 4], got {}",
                c.thumbnail_scale
            )));
        }
        if c.ocr_model.trim().is_empty() {
            return Err(DocFlowError::InvalidConfig("OCR model must not be empty".into()));
        }
        if !(c.ocr_endpoint.starts_with("http://") || c.ocr_endpoint.starts_with("https://")) {
            return Err(DocFlowError::InvalidConfig(format!(
                "OCR endpoint must be an HTTP/HTTPS URL, got '{}'",
                c.ocr_endpoint
            )));
        }
        if c.api_timeout_secs == 0 {
            return Err(DocFlowError::InvalidConfig("API timeout must be ≥ 1s".into()));
        }
        Ok(self.config)
    }
}

// ── Page selection ───────────────────────────────────────────────────────

/// One inclusive, 1-indexed page range as sent by the client: `[start, end]`.
///
/// Values are signed so that `0` or negative input reaches [`PageRange::expand`]
/// and is clamped like any other out-of-bounds value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRange(pub i64, pub i64);

impl PageRange {
    /// Clamp this range to `1..=total_pages` and list its 0-indexed pages.
    ///
    /// A range whose start lies after its end (after clamping) is walked
    /// backwards. Returns an empty list only when `total_pages` is 0.
    pub fn indices(&self, total_pages: usize) -> Vec<usize> {
        if total_pages == 0 {
            return Vec::new();
        }
        let last = total_pages as i64;
        let from = (self.0.clamp(1, last) - 1) as usize;
        let to = (self.1.clamp(1, last) - 1) as usize;
        if from <= to {
            (from..=to).collect()
        } else {
            (to..=from).rev().collect()
        }
    }

    /// Expand an ordered selection into 0-indexed pages.
    ///
    /// Order is the caller's; duplicates and overlaps are kept.
    pub fn expand(ranges: &[PageRange], total_pages: usize) -> Vec<usize> {
        ranges
            .iter()
            .flat_map(|r| r.indices(total_pages))
            .collect()
    }
}

// ── Export format ────────────────────────────────────────────────────────

/// Download format for an OCR result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Md,
    Txt,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Md => "md",
            ExportFormat::Txt => "txt",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = DocFlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "md" => Ok(ExportFormat::Md),
            "txt" => Ok(ExportFormat::Txt),
            other => Err(DocFlowError::InvalidExportFormat {
                format: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}
