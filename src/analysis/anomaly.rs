//! Rule-based anomaly scoring over document text and metadata.
//!
//! Independent heuristics each contribute a fixed additive weight when they
//! trigger; the composite score is clamped to 1.0 and mapped to a severity
//! band. The engine is a pure function of its inputs apart from a warn-level
//! event when a document is flagged.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{AnomalyFinding, Severity};

/// Character floor below which a document is suspiciously short.
pub const MIN_DOCUMENT_LENGTH: usize = 50;
/// Character ceiling above which a document is suspiciously long.
pub const MAX_DOCUMENT_LENGTH: usize = 500_000;
/// Ratio of non-alphanumeric, non-whitespace characters that counts as noisy.
const SPECIAL_CHAR_THRESHOLD: f32 = 0.3;
/// Unique-word ratio below which a document counts as repetitive.
const UNIQUE_WORD_THRESHOLD: f32 = 0.2;
/// Minimum word count before the repetition check is meaningful.
const MIN_WORDS_FOR_REPETITION_CHECK: usize = 20;

/// Decision threshold: anomalous iff score is strictly greater.
pub const ANOMALY_THRESHOLD: f32 = 0.3;

const WEIGHT_SHORT_DOCUMENT: f32 = 0.4;
const WEIGHT_LONG_DOCUMENT: f32 = 0.2;
const WEIGHT_SPECIAL_CHARS: f32 = 0.3;
const WEIGHT_REPETITION: f32 = 0.3;
const WEIGHT_SENSITIVE_PATTERN: f32 = 0.15;
const WEIGHT_ZERO_FILE_SIZE: f32 = 0.2;
const WEIGHT_EXECUTABLE_MIME: f32 = 0.5;

/// Sensitive-content patterns. Each matching pattern appends its own reason
/// and contributes the sensitive weight once per pattern.
static SENSITIVE_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    vec![
        (
            Regex::new(r"(?i)\b(confidential|classified|top\s+secret)\b").unwrap(),
            "confidentiality marker",
        ),
        (
            Regex::new(r"(?i)\b(password|passphrase|passwd)\b").unwrap(),
            "password-like term",
        ),
        (
            Regex::new(r"(?i)\b(card\s+number|credit\s+card|cvv)\b").unwrap(),
            "payment card reference",
        ),
    ]
});

/// Document metadata consulted by the scoring heuristics.
#[derive(Debug, Clone, Default)]
pub struct DocumentMetadata {
    pub file_size: Option<u64>,
    pub mime_type: Option<String>,
    pub document_id: Option<String>,
}

impl DocumentMetadata {
    /// Build metadata from a loosely-typed JSON map (anomaly-only requests).
    pub fn from_json_map(map: &std::collections::HashMap<String, serde_json::Value>) -> Self {
        Self {
            file_size: map.get("file_size").and_then(|v| v.as_u64()),
            mime_type: map
                .get("mime_type")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string()),
            document_id: map
                .get("document_id")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string()),
        }
    }
}

/// Score a document for anomalies.
pub fn detect(text: &str, metadata: &DocumentMetadata) -> AnomalyFinding {
    let mut reasons: Vec<String> = Vec::new();
    let mut score: f32 = 0.0;

    let char_count = text.chars().count();
    let trimmed_count = text.trim().chars().count();

    // Length checks are mutually exclusive: a text cannot be both.
    if trimmed_count < MIN_DOCUMENT_LENGTH {
        reasons.push(format!(
            "Document is extremely short (< {} characters)",
            MIN_DOCUMENT_LENGTH
        ));
        score += WEIGHT_SHORT_DOCUMENT;
    } else if char_count > MAX_DOCUMENT_LENGTH {
        reasons.push(format!(
            "Document is abnormally long (> {}k characters)",
            MAX_DOCUMENT_LENGTH / 1000
        ));
        score += WEIGHT_LONG_DOCUMENT;
    }

    if char_count > 0 {
        let special = text
            .chars()
            .filter(|c| !c.is_alphanumeric() && !c.is_whitespace())
            .count();
        let special_ratio = special as f32 / char_count as f32;
        if special_ratio > SPECIAL_CHAR_THRESHOLD {
            reasons.push(format!(
                "High proportion of special characters ({:.0}%)",
                special_ratio * 100.0
            ));
            score += WEIGHT_SPECIAL_CHARS;
        }
    }

    let words: Vec<String> = text.split_whitespace().map(|w| w.to_lowercase()).collect();
    if words.len() > MIN_WORDS_FOR_REPETITION_CHECK {
        let unique: std::collections::HashSet<&str> =
            words.iter().map(|w| w.as_str()).collect();
        let unique_ratio = unique.len() as f32 / words.len() as f32;
        if unique_ratio < UNIQUE_WORD_THRESHOLD {
            reasons.push(format!(
                "Highly repetitive text (uniqueness ratio: {:.0}%)",
                unique_ratio * 100.0
            ));
            score += WEIGHT_REPETITION;
        }
    }

    for (pattern, label) in SENSITIVE_PATTERNS.iter() {
        if pattern.is_match(text) {
            reasons.push(format!("Potentially sensitive content detected ({})", label));
            score += WEIGHT_SENSITIVE_PATTERN;
        }
    }

    if metadata.file_size == Some(0) {
        reasons.push("Zero file size recorded in metadata".to_string());
        score += WEIGHT_ZERO_FILE_SIZE;
    }

    if let Some(mime) = &metadata.mime_type {
        if mime.contains("executable") {
            reasons.push("Suspicious MIME type (executable)".to_string());
            score += WEIGHT_EXECUTABLE_MIME;
        }
    }

    let score = score.min(1.0);
    let severity = Severity::from_score(score);
    let is_anomalous = score > ANOMALY_THRESHOLD;

    if is_anomalous {
        tracing::warn!(
            score,
            severity = severity.as_str(),
            document_id = metadata.document_id.as_deref().unwrap_or("-"),
            "document flagged as anomalous"
        );
    }

    AnomalyFinding {
        is_anomalous,
        anomaly_score: round4(score),
        severity,
        reasons,
    }
}

fn round4(value: f32) -> f32 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normal_text() -> String {
        let sentence = "The quarterly report covers staffing budget travel and planning for every region office. ";
        sentence.repeat(3)
    }

    #[test]
    fn short_document_gets_short_weight_only() {
        // 10 characters, no sensitive patterns, empty metadata.
        let finding = detect("short text", &DocumentMetadata::default());
        assert_eq!(finding.anomaly_score, WEIGHT_SHORT_DOCUMENT);
        assert_eq!(finding.severity, Severity::Medium);
        assert!(finding.is_anomalous);
        assert_eq!(finding.reasons.len(), 1);
    }

    #[test]
    fn short_and_long_weights_are_mutually_exclusive() {
        let long_text = "word ".repeat(120_000);
        assert!(long_text.chars().count() > MAX_DOCUMENT_LENGTH);
        let finding = detect(&long_text, &DocumentMetadata::default());
        assert!(finding
            .reasons
            .iter()
            .any(|r| r.contains("abnormally long")));
        assert!(!finding.reasons.iter().any(|r| r.contains("extremely short")));
    }

    #[test]
    fn normal_document_is_clean() {
        let finding = detect(&normal_text(), &DocumentMetadata::default());
        assert_eq!(finding.anomaly_score, 0.0);
        assert_eq!(finding.severity, Severity::Low);
        assert!(!finding.is_anomalous);
        assert!(finding.reasons.is_empty());
    }

    #[test]
    fn zero_file_size_always_counts() {
        let metadata = DocumentMetadata {
            file_size: Some(0),
            ..Default::default()
        };
        let finding = detect(&normal_text(), &metadata);
        assert_eq!(finding.anomaly_score, WEIGHT_ZERO_FILE_SIZE);
        assert!(finding.reasons.iter().any(|r| r.contains("Zero file size")));
    }

    #[test]
    fn absent_file_size_does_not_count() {
        let finding = detect(&normal_text(), &DocumentMetadata::default());
        assert!(finding.reasons.is_empty());
    }

    #[test]
    fn executable_mime_is_heavily_weighted() {
        let metadata = DocumentMetadata {
            mime_type: Some("application/x-executable".to_string()),
            ..Default::default()
        };
        let finding = detect(&normal_text(), &metadata);
        assert_eq!(finding.anomaly_score, WEIGHT_EXECUTABLE_MIME);
        assert!(finding.is_anomalous);
    }

    #[test]
    fn sensitive_patterns_stack_per_pattern() {
        let text = format!(
            "{} This is confidential. The password is not here. Check the credit card on file.",
            normal_text()
        );
        let finding = detect(&text, &DocumentMetadata::default());
        assert!((finding.anomaly_score - WEIGHT_SENSITIVE_PATTERN * 3.0).abs() < 1e-3);
        assert_eq!(
            finding
                .reasons
                .iter()
                .filter(|r| r.contains("sensitive content"))
                .count(),
            3
        );
    }

    #[test]
    fn repetitive_text_is_flagged() {
        let text = "again again again again again ".repeat(10);
        let finding = detect(&text, &DocumentMetadata::default());
        assert!(finding
            .reasons
            .iter()
            .any(|r| r.contains("repetitive")));
    }

    #[test]
    fn special_character_noise_is_flagged() {
        let text = format!("{} {}", normal_text(), "#$%&@!^*()[]{}<>~|".repeat(20));
        let finding = detect(&text, &DocumentMetadata::default());
        assert!(finding
            .reasons
            .iter()
            .any(|r| r.contains("special characters")));
    }

    #[test]
    fn score_is_clamped_to_one() {
        let metadata = DocumentMetadata {
            file_size: Some(0),
            mime_type: Some("application/x-executable".to_string()),
            ..Default::default()
        };
        let finding = detect("confidential password cvv", &metadata);
        assert!(finding.anomaly_score <= 1.0);
        assert_eq!(finding.severity, Severity::Critical);
    }

    #[test]
    fn threshold_is_strictly_greater_than() {
        // A score of exactly 0.3 sits in the MEDIUM band without being
        // anomalous: the boundary comparison is strict. Varied words keep
        // the repetition heuristic quiet so only the length weight fires.
        let long_text: String = (0..120_000)
            .map(|i| format!("w{i}"))
            .collect::<Vec<_>>()
            .join(" ");
        assert!(long_text.chars().count() > MAX_DOCUMENT_LENGTH);
        let finding = detect(&long_text, &DocumentMetadata::default());
        assert_eq!(finding.anomaly_score, WEIGHT_LONG_DOCUMENT);
        assert!(!finding.is_anomalous);

        let metadata = DocumentMetadata {
            file_size: Some(0),
            ..Default::default()
        };
        // long (0.2) + zero size (0.2) crosses the threshold.
        let finding = detect(&long_text, &metadata);
        assert!(finding.is_anomalous);
        assert_eq!(Severity::from_score(ANOMALY_THRESHOLD), Severity::Medium);
    }
}
