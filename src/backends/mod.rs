//! Backend capability ports.
//!
//! Every analytical capability (classification, entity extraction,
//! summarization, embeddings, OCR) is a trait with exactly two
//! implementations: a deterministic simulated one that is always available,
//! and a real one backed by an external service or binary. The choice is
//! made once, at load time, inside [`BackendSet::load`]; a capability whose
//! real backend fails to initialize logs a warning and stays simulated for
//! the lifetime of the process. Callers only ever see the trait objects.

mod classifier;
mod embedding;
mod entities;
mod inference;
mod ocr;
mod summarizer;

pub use classifier::{InferenceClassifier, LexiconClassifier};
pub use embedding::InferenceEmbedder;
pub use entities::{InferenceEntityExtractor, RegexEntityExtractor};
pub use inference::InferenceClient;
pub use ocr::{SimulatedOcr, TesseractOcr};
pub use summarizer::{ExtractiveSummarizer, InferenceSummarizer};

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::Settings;
use crate::models::{Classification, EntityExtraction, OcrOutcome, Summarization};

/// Errors from backend implementations.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Backend not available: {0}")]
    Unavailable(String),

    #[error("Backend request failed: {0}")]
    Api(String),

    #[error("Backend response could not be parsed: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Which implementation a port resolved to at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendMode {
    Simulated,
    Real,
}

impl BackendMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Simulated => "simulated",
            Self::Real => "real",
        }
    }
}

impl std::fmt::Display for BackendMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Assigns a category to a document text.
#[async_trait]
pub trait Classifier: Send + Sync {
    fn mode(&self) -> BackendMode;

    async fn classify(&self, text: &str) -> Result<Classification, BackendError>;
}

/// Extracts named entities from a document text.
#[async_trait]
pub trait EntityExtractor: Send + Sync {
    fn mode(&self) -> BackendMode;

    async fn extract(&self, text: &str, language: &str)
        -> Result<EntityExtraction, BackendError>;
}

/// Produces a bounded-length summary of a document text.
#[async_trait]
pub trait Summarizer: Send + Sync {
    fn mode(&self) -> BackendMode;

    async fn summarize(
        &self,
        text: &str,
        max_length: usize,
        min_length: usize,
    ) -> Result<Summarization, BackendError>;
}

/// Encodes texts into embedding vectors for similarity ranking.
///
/// Only a real implementation exists; when no embedder is available the
/// ranking engine falls back to its lexical strategy instead.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, BackendError>;
}

/// Recognizes text in images and scanned PDFs.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    fn mode(&self) -> BackendMode;

    async fn ocr_image(&self, bytes: &[u8]) -> Result<OcrOutcome, BackendError>;

    async fn ocr_pdf(&self, bytes: &[u8]) -> Result<OcrOutcome, BackendError>;
}

/// The set of initialized capability ports, built once at startup and shared
/// read-only across requests.
#[derive(Clone)]
pub struct BackendSet {
    pub classifier: Arc<dyn Classifier>,
    pub entities: Arc<dyn EntityExtractor>,
    pub summarizer: Arc<dyn Summarizer>,
    pub embedder: Option<Arc<dyn Embedder>>,
    pub ocr: Arc<dyn OcrEngine>,
}

impl BackendSet {
    /// Initialize all capability ports, preferring real backends and
    /// degrading permanently to simulated ones when initialization fails.
    pub async fn load(settings: &Settings) -> Self {
        let inference = Self::probe_inference(settings).await;
        let ocr = Self::select_ocr(settings);

        match inference {
            Some(client) => Self {
                classifier: Arc::new(InferenceClassifier::new(client.clone())),
                entities: Arc::new(InferenceEntityExtractor::new(client.clone())),
                summarizer: Arc::new(InferenceSummarizer::new(client.clone())),
                embedder: Some(Arc::new(InferenceEmbedder::new(client))),
                ocr,
            },
            None => Self {
                ocr,
                ..Self::simulated(settings)
            },
        }
    }

    /// All-simulated set: no external dependencies at all.
    pub fn simulated(settings: &Settings) -> Self {
        Self {
            classifier: Arc::new(LexiconClassifier::new()),
            entities: Arc::new(RegexEntityExtractor::new()),
            summarizer: Arc::new(ExtractiveSummarizer::new()),
            embedder: None,
            ocr: Arc::new(SimulatedOcr::new(&settings.ocr_language)),
        }
    }

    async fn probe_inference(settings: &Settings) -> Option<Arc<InferenceClient>> {
        let endpoint = settings.inference_endpoint.as_ref()?;
        let client = match InferenceClient::new(
            endpoint.clone(),
            settings.inference_model.clone(),
            settings.embedding_model.clone(),
        ) {
            Ok(client) => client,
            Err(e) => {
                tracing::warn!(
                    endpoint,
                    error = %e,
                    "failed to build inference client, language capabilities stay simulated"
                );
                return None;
            }
        };

        if client.is_available().await {
            tracing::info!(endpoint, model = %settings.inference_model, "inference backend online");
            Some(Arc::new(client))
        } else {
            tracing::warn!(
                endpoint,
                "inference endpoint unreachable, language capabilities stay simulated"
            );
            None
        }
    }

    fn select_ocr(settings: &Settings) -> Arc<dyn OcrEngine> {
        if TesseractOcr::is_available() {
            Arc::new(TesseractOcr::new(settings.ocr_language.clone()))
        } else {
            tracing::warn!(
                "{}, OCR stays simulated",
                TesseractOcr::availability_hint()
            );
            Arc::new(SimulatedOcr::new(&settings.ocr_language))
        }
    }

    /// Mode of every capability, for health reporting and the `check` command.
    pub fn modes(&self) -> Vec<(&'static str, BackendMode)> {
        vec![
            ("classifier", self.classifier.mode()),
            ("entities", self.entities.mode()),
            ("summarizer", self.summarizer.mode()),
            (
                "embeddings",
                if self.embedder.is_some() {
                    BackendMode::Real
                } else {
                    BackendMode::Simulated
                },
            ),
            ("ocr", self.ocr.mode()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulated_set_has_no_embedder() {
        let set = BackendSet::simulated(&Settings::default());
        assert!(set.embedder.is_none());
        assert_eq!(set.classifier.mode(), BackendMode::Simulated);
        assert_eq!(set.ocr.mode(), BackendMode::Simulated);
    }

    #[tokio::test]
    async fn load_without_endpoint_is_fully_simulated() {
        let set = BackendSet::load(&Settings::default()).await;
        assert_eq!(set.classifier.mode(), BackendMode::Simulated);
        assert!(set.embedder.is_none());
    }

    #[tokio::test]
    async fn load_with_dead_endpoint_degrades_to_simulated() {
        let settings = Settings {
            // Discard port on loopback: connection is refused immediately.
            inference_endpoint: Some("http://127.0.0.1:9".to_string()),
            ..Settings::default()
        };
        let set = BackendSet::load(&settings).await;
        assert_eq!(set.classifier.mode(), BackendMode::Simulated);
        assert_eq!(set.summarizer.mode(), BackendMode::Simulated);
        assert!(set.embedder.is_none());
    }
}
