//! Full-document analysis pipeline.
//!
//! Orchestrates extraction, language detection, normalization,
//! classification, entity extraction, conditional summarization and anomaly
//! scoring into one result envelope. Validation failures and stage errors
//! both surface as failure envelopes; the only partial success is the
//! "document carries no text" early return.

use std::sync::Arc;
use std::sync::LazyLock;
use std::time::Instant;

use regex::{Regex, RegexBuilder};
use thiserror::Error;

use crate::analysis::anomaly::{self, DocumentMetadata};
use crate::backends::{BackendError, BackendSet};
use crate::config::Settings;
use crate::extract::{self, RawDocument};
use crate::models::{AnalysisReport, ApiResponse};
use crate::storage::{ObjectStore, StorageError};
use crate::text::{self, language};
use crate::utils::mime;

/// Normalized texts shorter than this skip summarization.
pub const SUMMARY_MIN_SOURCE_CHARS: usize = 100;

static UUID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$").unwrap()
});

static STORAGE_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(r"^[\w./-]{1,1000}$")
        .size_limit(512 * 1024 * 1024)
        .build()
        .unwrap()
});

#[derive(Debug, Error)]
enum PipelineError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// The pipeline orchestrator. Holds the initialized ports and the storage
/// collaborator; everything else is request-scoped.
pub struct Pipeline {
    backends: Arc<BackendSet>,
    store: Arc<dyn ObjectStore>,
    settings: Arc<Settings>,
}

impl Pipeline {
    pub fn new(
        backends: Arc<BackendSet>,
        store: Arc<dyn ObjectStore>,
        settings: Arc<Settings>,
    ) -> Self {
        Self {
            backends,
            store,
            settings,
        }
    }

    /// Run the full analysis for a stored document.
    ///
    /// Always returns an envelope: validation failures and stage errors are
    /// reported as unsuccessful responses, never as panics or Err values.
    pub async fn analyze_document(
        &self,
        document_id: &str,
        storage_key: &str,
    ) -> ApiResponse<AnalysisReport> {
        let start = Instant::now();

        // Rejected requests never reach the storage fetch.
        if !UUID_RE.is_match(&document_id.to_lowercase()) {
            return ApiResponse::failure("documentId must be a UUID", start.elapsed());
        }
        if !STORAGE_KEY_RE.is_match(storage_key) || storage_key.contains("..") {
            return ApiResponse::failure("storageKey is invalid or unsafe", start.elapsed());
        }

        tracing::info!(document_id, storage_key, "pipeline started");

        match self.run_stages(document_id, storage_key, start).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(document_id, error = %e, "pipeline failed");
                ApiResponse::failure("Document analysis failed", start.elapsed())
            }
        }
    }

    async fn run_stages(
        &self,
        document_id: &str,
        storage_key: &str,
        start: Instant,
    ) -> Result<ApiResponse<AnalysisReport>, PipelineError> {
        let bytes = self.store.fetch(storage_key).await?;
        let file_size = bytes.len() as u64;
        tracing::debug!(document_id, file_size, "document fetched");

        let declared_mime = mime::mime_from_key(storage_key);
        if let Some(detected) = mime::detect_mime_mismatch(&bytes, &declared_mime) {
            tracing::debug!(document_id, declared = %declared_mime, detected, "MIME mismatch");
        }

        let raw = RawDocument::new(bytes, storage_key);
        let extracted = extract::extract_text(raw, self.backends.ocr.as_ref()).await;

        if extracted.text.trim().is_empty() {
            // Legitimate outcome: some documents genuinely carry no text.
            tracing::warn!(document_id, "no extractable text");
            let report = AnalysisReport {
                ocr_text: extracted.ocr_text,
                ..Default::default()
            };
            return Ok(ApiResponse::ok(
                "No extractable text in document",
                report,
                start.elapsed(),
            ));
        }

        let guess = language::detect_language(&extracted.text, &self.settings.default_language);
        let cleaned = text::clean_text(&extracted.text, self.settings.max_text_length);

        let classification = self.backends.classifier.classify(&cleaned).await?;
        let extraction = self
            .backends
            .entities
            .extract(&cleaned, &guess.code)
            .await?;

        let summarization = if cleaned.chars().count() >= SUMMARY_MIN_SOURCE_CHARS {
            Some(
                self.backends
                    .summarizer
                    .summarize(
                        &cleaned,
                        self.settings.summary_max_length,
                        self.settings.summary_min_length,
                    )
                    .await?,
            )
        } else {
            None
        };

        let metadata = DocumentMetadata {
            file_size: Some(file_size),
            mime_type: Some(declared_mime),
            document_id: Some(document_id.to_string()),
        };
        let finding = anomaly::detect(&cleaned, &metadata);

        let report = AnalysisReport {
            classification: Some(classification),
            extraction: Some(extraction),
            summarization,
            anomaly: Some(finding),
            ocr_text: extracted.ocr_text.filter(|t| !t.is_empty()),
        };

        tracing::info!(
            document_id,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "pipeline completed"
        );

        Ok(ApiResponse::ok(
            "Full analysis completed",
            report,
            start.elapsed(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuid_pattern_accepts_canonical_form() {
        assert!(UUID_RE.is_match("123e4567-e89b-12d3-a456-426614174000"));
        assert!(!UUID_RE.is_match("123e4567e89b12d3a456426614174000"));
        assert!(!UUID_RE.is_match("not-a-uuid"));
        assert!(!UUID_RE.is_match("123e4567-e89b-12d3-a456-4266141740000"));
    }

    #[test]
    fn storage_key_pattern_rejects_suspicious_keys() {
        assert!(STORAGE_KEY_RE.is_match("documents/2024/report.pdf"));
        assert!(!STORAGE_KEY_RE.is_match("key with spaces"));
        assert!(!STORAGE_KEY_RE.is_match(""));
        // The `..` check is separate from the character allow-list.
        assert!(STORAGE_KEY_RE.is_match("a/../b"));
        assert!("a/../b".contains(".."));
    }
}
