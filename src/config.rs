//! Configuration for the docsight service.
//!
//! Settings are environment-driven (with `.env` support via dotenvy) so the
//! service can run unconfigured in development: no API key means open access,
//! no inference endpoint means simulated backends.

use std::env;
use std::path::PathBuf;

/// Version string reported in every response envelope.
pub const MODEL_VERSION: &str = "1.0.0";

/// Runtime settings, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Shared API key checked against the `X-API-Key` header. Empty disables auth.
    pub api_key: String,
    /// Root directory of the document object store.
    pub documents_dir: PathBuf,
    /// Base URL of an Ollama-compatible inference service. None keeps all
    /// NLP capabilities in simulated mode.
    pub inference_endpoint: Option<String>,
    /// Model used for classification, entity extraction and summarization.
    pub inference_model: String,
    /// Model used for embedding vectors in search ranking.
    pub embedding_model: String,
    /// Tesseract language code (e.g. "eng", "fra").
    pub ocr_language: String,
    /// Fallback ISO 639-1 code when language detection is unreliable.
    pub default_language: String,
    /// Upload ceiling for the OCR endpoint, in megabytes.
    pub max_file_size_mb: u64,
    /// Request text ceiling, in characters.
    pub max_text_length: usize,
    /// Default summary length bounds, in characters.
    pub summary_max_length: usize,
    pub summary_min_length: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            documents_dir: PathBuf::from("./documents"),
            inference_endpoint: None,
            inference_model: "llama3.2".to_string(),
            embedding_model: "nomic-embed-text".to_string(),
            ocr_language: "eng".to_string(),
            default_language: "en".to_string(),
            max_file_size_mb: 50,
            max_text_length: 100_000,
            summary_max_length: 300,
            summary_min_length: 50,
        }
    }
}

impl Settings {
    /// Load settings from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_key: env_string("DOCSIGHT_API_KEY").unwrap_or(defaults.api_key),
            documents_dir: env_string("DOCSIGHT_DOCUMENTS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.documents_dir),
            inference_endpoint: env_string("DOCSIGHT_INFERENCE_URL")
                .map(|url| url.trim_end_matches('/').to_string()),
            inference_model: env_string("DOCSIGHT_INFERENCE_MODEL")
                .unwrap_or(defaults.inference_model),
            embedding_model: env_string("DOCSIGHT_EMBEDDING_MODEL")
                .unwrap_or(defaults.embedding_model),
            ocr_language: env_string("DOCSIGHT_OCR_LANGUAGE").unwrap_or(defaults.ocr_language),
            default_language: env_string("DOCSIGHT_DEFAULT_LANGUAGE")
                .unwrap_or(defaults.default_language),
            max_file_size_mb: env_parsed("DOCSIGHT_MAX_FILE_SIZE_MB")
                .unwrap_or(defaults.max_file_size_mb),
            max_text_length: env_parsed("DOCSIGHT_MAX_TEXT_LENGTH")
                .unwrap_or(defaults.max_text_length),
            summary_max_length: env_parsed("DOCSIGHT_SUMMARY_MAX_LENGTH")
                .unwrap_or(defaults.summary_max_length),
            summary_min_length: env_parsed("DOCSIGHT_SUMMARY_MIN_LENGTH")
                .unwrap_or(defaults.summary_min_length),
        }
    }

    /// Upload ceiling in bytes.
    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb * 1024 * 1024
    }
}

fn env_string(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}
