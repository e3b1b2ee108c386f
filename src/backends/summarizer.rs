//! Summarization backends.

use std::sync::Arc;

use async_trait::async_trait;

use super::{BackendError, BackendMode, InferenceClient, Summarizer};
use crate::models::Summarization;
use crate::text::split_sentences;

/// Characters of document text sent to the inference model.
const SUMMARIZE_INPUT_CHARS: usize = 8192;

/// The extractive budget is a multiple of the target length so whole leading
/// sentences fit before the cut.
const EXTRACTIVE_BUDGET_FACTOR: usize = 4;

/// Simulated summarizer: selects leading sentences up to a length budget.
pub struct ExtractiveSummarizer;

impl ExtractiveSummarizer {
    pub fn new() -> Self {
        Self
    }

    fn extract_summary(text: &str, max_length: usize) -> String {
        let sentences = split_sentences(text);
        if sentences.is_empty() {
            return text.chars().take(max_length).collect();
        }

        let budget = max_length * EXTRACTIVE_BUDGET_FACTOR;
        let mut parts: Vec<&str> = Vec::new();
        let mut used = 0;
        for sentence in &sentences {
            let len = sentence.chars().count();
            if used + len > budget {
                break;
            }
            parts.push(sentence.as_str());
            used += len;
        }

        if parts.is_empty() {
            sentences[0].clone()
        } else {
            parts.join(" ")
        }
    }
}

impl Default for ExtractiveSummarizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Summarizer for ExtractiveSummarizer {
    fn mode(&self) -> BackendMode {
        BackendMode::Simulated
    }

    async fn summarize(
        &self,
        text: &str,
        max_length: usize,
        _min_length: usize,
    ) -> Result<Summarization, BackendError> {
        let summary = Self::extract_summary(text, max_length);
        Ok(build_summarization(text, summary))
    }
}

/// Real summarizer backed by the inference service.
pub struct InferenceSummarizer {
    client: Arc<InferenceClient>,
}

impl InferenceSummarizer {
    pub fn new(client: Arc<InferenceClient>) -> Self {
        Self { client }
    }

    fn prompt(text: &str, max_length: usize, min_length: usize) -> String {
        let excerpt: String = text.chars().take(SUMMARIZE_INPUT_CHARS).collect();
        format!(
            "Summarize the following document in {} to {} characters. \
             Answer with the summary only.\n\nDocument:\n{}",
            min_length, max_length, excerpt
        )
    }
}

#[async_trait]
impl Summarizer for InferenceSummarizer {
    fn mode(&self) -> BackendMode {
        BackendMode::Real
    }

    async fn summarize(
        &self,
        text: &str,
        max_length: usize,
        min_length: usize,
    ) -> Result<Summarization, BackendError> {
        let answer = self
            .client
            .generate(&Self::prompt(text, max_length, min_length))
            .await?;
        let summary = answer.trim().to_string();
        if summary.is_empty() {
            return Err(BackendError::Parse("empty summary answer".to_string()));
        }
        Ok(build_summarization(text, summary))
    }
}

fn build_summarization(original: &str, summary: String) -> Summarization {
    let original_length = original.chars().count();
    let summary_length = summary.chars().count();
    let compression_ratio = if original_length > 0 {
        let ratio = summary_length as f32 / original_length as f32;
        (ratio * 10_000.0).round() / 10_000.0
    } else {
        0.0
    };

    Summarization {
        summary,
        original_length,
        summary_length,
        compression_ratio,
    }
}
