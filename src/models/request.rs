//! Inbound request payloads.

use std::collections::HashMap;

use serde::Deserialize;

/// Full-pipeline analysis request, as sent by the backend service.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    /// UUID of the document in the upstream database.
    pub document_id: String,
    /// Object-store key of the document bytes.
    pub storage_key: String,
}

/// Text classification request.
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifyRequest {
    pub text: String,
    #[serde(default = "default_language")]
    pub language: String,
}

/// Named-entity extraction request.
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractRequest {
    pub text: String,
    #[serde(default = "default_language")]
    pub language: String,
}

/// Summarization request with summary length bounds in characters.
#[derive(Debug, Clone, Deserialize)]
pub struct SummarizeRequest {
    pub text: String,
    #[serde(default = "default_summary_max")]
    pub max_length: usize,
    #[serde(default = "default_summary_min")]
    pub min_length: usize,
}

/// One candidate document for search ranking.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchCandidate {
    pub id: String,
    #[serde(default)]
    pub text: String,
}

/// Search request over a caller-provided candidate set.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub documents: Vec<SearchCandidate>,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

/// Anomaly-only detection request.
#[derive(Debug, Clone, Deserialize)]
pub struct AnomalyRequest {
    pub text: String,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

fn default_language() -> String {
    "en".to_string()
}

fn default_summary_max() -> usize {
    300
}

fn default_summary_min() -> usize {
    50
}

fn default_top_k() -> usize {
    5
}
