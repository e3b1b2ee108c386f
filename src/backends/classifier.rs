//! Document classification backends.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;

use super::{BackendError, BackendMode, Classifier, InferenceClient};
use crate::models::{Classification, DocumentCategory};

/// Confidence reported when the lexicon finds no signal at all.
const NO_SIGNAL_CONFIDENCE: f32 = 0.25;

/// Characters of document text sent to the inference model.
const CLASSIFY_INPUT_CHARS: usize = 2048;

/// Keyword lexicon per category. Hits are counted as whole words over the
/// lowercased text, which keeps the simulated classifier deterministic and
/// still useful on real documents.
const LEXICON: &[(DocumentCategory, &[&str])] = &[
    (
        DocumentCategory::Decision,
        &["decision", "decree", "ruling", "approval", "authorization", "resolution"],
    ),
    (
        DocumentCategory::Circular,
        &["circular", "directive", "instruction", "notice", "memorandum"],
    ),
    (
        DocumentCategory::Report,
        &["report", "findings", "assessment", "analysis", "overview"],
    ),
    (
        DocumentCategory::Budget,
        &["budget", "expenditure", "allocation", "fiscal", "invoice", "finance"],
    ),
    (
        DocumentCategory::HumanResources,
        &["recruitment", "staff", "employee", "payroll", "leave", "promotion"],
    ),
    (
        DocumentCategory::Correspondence,
        &["letter", "correspondence", "reply", "dear", "sincerely"],
    ),
    (
        DocumentCategory::Project,
        &["project", "milestone", "deliverable", "roadmap", "phase"],
    ),
    (
        DocumentCategory::Inspection,
        &["inspection", "audit", "evaluation", "compliance", "inspector"],
    ),
    (
        DocumentCategory::Archive,
        &["archive", "archived", "retention", "records"],
    ),
];

/// Deterministic simulated classifier based on keyword counting.
pub struct LexiconClassifier;

impl LexiconClassifier {
    pub fn new() -> Self {
        Self
    }

    fn score(text: &str) -> Classification {
        let words: Vec<String> = text
            .split_whitespace()
            .map(|w| {
                w.trim_matches(|c: char| !c.is_alphanumeric())
                    .to_lowercase()
            })
            .collect();

        let mut hits: Vec<(DocumentCategory, usize)> = LEXICON
            .iter()
            .map(|(category, keywords)| {
                let count = words
                    .iter()
                    .filter(|w| keywords.contains(&w.as_str()))
                    .count();
                (*category, count)
            })
            .collect();

        let total: usize = hits.iter().map(|(_, c)| c).sum();
        if total == 0 {
            let mut all_scores = BTreeMap::new();
            all_scores.insert(
                DocumentCategory::Other.as_str().to_string(),
                NO_SIGNAL_CONFIDENCE,
            );
            return Classification {
                category: DocumentCategory::Other,
                confidence: NO_SIGNAL_CONFIDENCE,
                all_scores,
            };
        }

        // Stable: ties resolve to the lexicon declaration order.
        hits.sort_by(|a, b| b.1.cmp(&a.1));
        let (top_category, top_hits) = hits[0];

        let all_scores: BTreeMap<String, f32> = hits
            .iter()
            .filter(|(_, count)| *count > 0)
            .map(|(category, count)| {
                (
                    category.as_str().to_string(),
                    round4(*count as f32 / total as f32),
                )
            })
            .collect();

        Classification {
            category: top_category,
            confidence: round4(top_hits as f32 / total as f32),
            all_scores,
        }
    }
}

impl Default for LexiconClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Classifier for LexiconClassifier {
    fn mode(&self) -> BackendMode {
        BackendMode::Simulated
    }

    async fn classify(&self, text: &str) -> Result<Classification, BackendError> {
        Ok(Self::score(text))
    }
}

/// Real classifier backed by the inference service.
pub struct InferenceClassifier {
    client: Arc<InferenceClient>,
}

impl InferenceClassifier {
    pub fn new(client: Arc<InferenceClient>) -> Self {
        Self { client }
    }

    fn prompt(text: &str) -> String {
        let categories: Vec<&str> = DocumentCategory::all().iter().map(|c| c.as_str()).collect();
        let excerpt: String = text.chars().take(CLASSIFY_INPUT_CHARS).collect();
        format!(
            "Classify the following document into exactly one of these categories: {}.\n\
             Answer with the category name only.\n\nDocument:\n{}",
            categories.join(", "),
            excerpt
        )
    }
}

#[async_trait]
impl Classifier for InferenceClassifier {
    fn mode(&self) -> BackendMode {
        BackendMode::Real
    }

    async fn classify(&self, text: &str) -> Result<Classification, BackendError> {
        let answer = self.client.generate(&Self::prompt(text)).await?;
        let label = answer
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .unwrap_or("");
        let category = DocumentCategory::from_label(label);

        let confidence = 0.8;
        let mut all_scores = BTreeMap::new();
        all_scores.insert(category.as_str().to_string(), confidence);

        Ok(Classification {
            category,
            confidence,
            all_scores,
        })
    }
}

fn round4(value: f32) -> f32 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn budget_text_classifies_as_budget() {
        let classifier = LexiconClassifier::new();
        let result = classifier
            .classify("The annual budget allocates expenditure across fiscal quarters.")
            .await
            .unwrap();
        assert_eq!(result.category, DocumentCategory::Budget);
        assert!(result.confidence > 0.5);
        assert!(result.all_scores.contains_key("BUDGET"));
    }

    #[tokio::test]
    async fn unmatched_text_falls_back_to_other() {
        let classifier = LexiconClassifier::new();
        let result = classifier.classify("zxqv wvut ppol").await.unwrap();
        assert_eq!(result.category, DocumentCategory::Other);
        assert_eq!(result.confidence, NO_SIGNAL_CONFIDENCE);
    }

    #[tokio::test]
    async fn classification_is_deterministic() {
        let classifier = LexiconClassifier::new();
        let text = "Inspection audit of the project milestone deliverable.";
        let a = classifier.classify(text).await.unwrap();
        let b = classifier.classify(text).await.unwrap();
        assert_eq!(a.category, b.category);
        assert_eq!(a.confidence, b.confidence);
        assert_eq!(a.all_scores, b.all_scores);
    }

    #[tokio::test]
    async fn scores_sum_to_one_over_matched_categories() {
        let classifier = LexiconClassifier::new();
        let result = classifier
            .classify("budget audit report")
            .await
            .unwrap();
        let total: f32 = result.all_scores.values().sum();
        assert!((total - 1.0).abs() < 1e-3);
    }
}
