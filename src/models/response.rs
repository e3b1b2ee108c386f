//! Outbound result models and the uniform response envelope.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::MODEL_VERSION;

/// Document categories assigned by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentCategory {
    Decision,
    Circular,
    Report,
    Budget,
    HumanResources,
    Correspondence,
    Project,
    Inspection,
    Archive,
    Other,
}

impl DocumentCategory {
    /// All categories, in stable order.
    pub fn all() -> &'static [DocumentCategory] {
        &[
            Self::Decision,
            Self::Circular,
            Self::Report,
            Self::Budget,
            Self::HumanResources,
            Self::Correspondence,
            Self::Project,
            Self::Inspection,
            Self::Archive,
            Self::Other,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Decision => "DECISION",
            Self::Circular => "CIRCULAR",
            Self::Report => "REPORT",
            Self::Budget => "BUDGET",
            Self::HumanResources => "HUMAN_RESOURCES",
            Self::Correspondence => "CORRESPONDENCE",
            Self::Project => "PROJECT",
            Self::Inspection => "INSPECTION",
            Self::Archive => "ARCHIVE",
            Self::Other => "OTHER",
        }
    }

    /// Parse a category from a free-text label, tolerating case and spacing.
    pub fn from_label(label: &str) -> Self {
        let normalized = label.trim().to_ascii_uppercase().replace([' ', '-'], "_");
        Self::all()
            .iter()
            .copied()
            .find(|c| c.as_str() == normalized)
            .unwrap_or(Self::Other)
    }
}

impl std::fmt::Display for DocumentCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classification result: top category plus per-category scores.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classification {
    pub category: DocumentCategory,
    pub confidence: f32,
    #[serde(default)]
    pub all_scores: BTreeMap<String, f32>,
}

/// A named entity with its byte-offset span in the source text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub text: String,
    pub label: String,
    pub start: usize,
    pub end: usize,
    pub confidence: f32,
}

/// Named-entity extraction result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityExtraction {
    pub entities: Vec<Entity>,
    pub entity_count: usize,
    pub language: String,
}

/// Summarization result with compression statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summarization {
    pub summary: String,
    pub original_length: usize,
    pub summary_length: usize,
    pub compression_ratio: f32,
}

/// OCR result over an image or a scanned PDF.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrOutcome {
    pub text: String,
    pub pages: u32,
    pub confidence: f32,
    pub language: String,
}

/// Severity band of an anomaly score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Map a composite score to its severity band.
    pub fn from_score(score: f32) -> Self {
        if score >= 0.8 {
            Self::Critical
        } else if score >= 0.6 {
            Self::High
        } else if score >= 0.3 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }
}

/// Composite anomaly verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnomalyFinding {
    pub is_anomalous: bool,
    pub anomaly_score: f32,
    pub severity: Severity,
    pub reasons: Vec<String>,
}

/// One ranked search hit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub document_id: String,
    pub score: f32,
    pub snippet: String,
}

/// Ranked search outcome for one query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchOutcome {
    pub query: String,
    pub results: Vec<SearchHit>,
    pub total: usize,
}

/// Aggregate result of the full analysis pipeline.
///
/// Each field is independently optional: absence means the stage was skipped
/// (short text skips summarization, blank extraction skips everything), never
/// that it failed silently.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classification: Option<Classification>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extraction: Option<EntityExtraction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summarization: Option<Summarization>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anomaly: Option<AnomalyFinding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ocr_text: Option<String>,
}

/// Uniform envelope wrapping every API result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    pub processing_time_ms: f64,
    pub model_version: String,
    pub timestamp: DateTime<Utc>,
}

impl<T> ApiResponse<T> {
    /// Successful response carrying a payload.
    pub fn ok(message: impl Into<String>, data: T, elapsed: Duration) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            processing_time_ms: elapsed_ms(elapsed),
            model_version: MODEL_VERSION.to_string(),
            timestamp: Utc::now(),
        }
    }

    /// Failure response; the message must not expose internals.
    pub fn failure(message: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            processing_time_ms: elapsed_ms(elapsed),
            model_version: MODEL_VERSION.to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Round a duration to hundredths of a millisecond for the envelope.
fn elapsed_ms(elapsed: Duration) -> f64 {
    (elapsed.as_secs_f64() * 1000.0 * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_from_label_is_lenient() {
        assert_eq!(DocumentCategory::from_label("report"), DocumentCategory::Report);
        assert_eq!(
            DocumentCategory::from_label("human resources"),
            DocumentCategory::HumanResources
        );
        assert_eq!(DocumentCategory::from_label("gibberish"), DocumentCategory::Other);
    }

    #[test]
    fn severity_bands() {
        assert_eq!(Severity::from_score(0.0), Severity::Low);
        assert_eq!(Severity::from_score(0.3), Severity::Medium);
        assert_eq!(Severity::from_score(0.6), Severity::High);
        assert_eq!(Severity::from_score(0.8), Severity::Critical);
        assert_eq!(Severity::from_score(1.0), Severity::Critical);
    }

    #[test]
    fn envelope_omits_absent_data() {
        let resp = ApiResponse::<Classification>::failure("nope", Duration::from_millis(3));
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["success"], false);
        assert!(json.get("data").is_none());
        assert_eq!(json["model_version"], MODEL_VERSION);
    }

    #[test]
    fn report_skips_empty_fields() {
        let report = AnalysisReport {
            ocr_text: Some("scanned".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("classification").is_none());
        assert_eq!(json["ocr_text"], "scanned");
    }
}
