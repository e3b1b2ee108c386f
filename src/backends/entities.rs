//! Named-entity extraction backends.

use std::sync::Arc;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;

use super::{BackendError, BackendMode, EntityExtractor, InferenceClient};
use crate::models::{Entity, EntityExtraction};

/// Characters of document text sent to the inference model.
const EXTRACT_INPUT_CHARS: usize = 4096;

static DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,2}[/-]\d{1,2}[/-]\d{2,4}|\d{4}-\d{2}-\d{2})\b").unwrap()
});

static MONEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b\d[\d\s.,]*\s*(USD|EUR|GBP|MAD|dollars?|euros?|\$|€|£)").unwrap()
});

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[\w.+-]+@[\w-]+\.[\w.-]+\b").unwrap());

static REFERENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:No\.|Ref\.?|Reference)\s*:?\s*[\w/-]+").unwrap()
});

/// Deterministic simulated extractor based on surface patterns.
pub struct RegexEntityExtractor;

impl RegexEntityExtractor {
    pub fn new() -> Self {
        Self
    }

    fn run_patterns(text: &str) -> Vec<Entity> {
        let mut entities = Vec::new();

        for m in DATE_RE.find_iter(text) {
            entities.push(entity(m, "DATE", 0.9));
        }
        for m in MONEY_RE.find_iter(text) {
            entities.push(entity(m, "MONEY", 0.85));
        }
        for m in EMAIL_RE.find_iter(text) {
            entities.push(entity(m, "EMAIL", 0.95));
        }
        for m in REFERENCE_RE.find_iter(text) {
            entities.push(entity(m, "REFERENCE", 0.8));
        }

        entities
    }
}

impl Default for RegexEntityExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn entity(m: regex::Match<'_>, label: &str, confidence: f32) -> Entity {
    Entity {
        text: m.as_str().trim().to_string(),
        label: label.to_string(),
        start: m.start(),
        end: m.end(),
        confidence,
    }
}

#[async_trait]
impl EntityExtractor for RegexEntityExtractor {
    fn mode(&self) -> BackendMode {
        BackendMode::Simulated
    }

    async fn extract(
        &self,
        text: &str,
        language: &str,
    ) -> Result<EntityExtraction, BackendError> {
        let entities = Self::run_patterns(text);
        Ok(EntityExtraction {
            entity_count: entities.len(),
            entities,
            language: language.to_string(),
        })
    }
}

/// Real extractor backed by the inference service.
pub struct InferenceEntityExtractor {
    client: Arc<InferenceClient>,
}

#[derive(Debug, Deserialize)]
struct RawEntity {
    text: String,
    label: String,
}

impl InferenceEntityExtractor {
    pub fn new(client: Arc<InferenceClient>) -> Self {
        Self { client }
    }

    fn prompt(text: &str) -> String {
        let excerpt: String = text.chars().take(EXTRACT_INPUT_CHARS).collect();
        format!(
            "List the named entities (persons, organizations, locations, dates, amounts) \
             in the following document as a JSON array of objects with \"text\" and \
             \"label\" fields. Answer with JSON only.\n\nDocument:\n{}",
            excerpt
        )
    }

    /// Pull the first JSON array out of a model answer.
    fn parse_entities(answer: &str, source: &str) -> Result<Vec<Entity>, BackendError> {
        let start = answer
            .find('[')
            .ok_or_else(|| BackendError::Parse("no JSON array in answer".to_string()))?;
        let end = answer
            .rfind(']')
            .ok_or_else(|| BackendError::Parse("unterminated JSON array".to_string()))?;
        let raw: Vec<RawEntity> = serde_json::from_str(&answer[start..=end])
            .map_err(|e| BackendError::Parse(e.to_string()))?;

        // Anchor each entity to its first occurrence; hallucinated spans are dropped.
        Ok(raw
            .into_iter()
            .filter_map(|e| {
                source.find(&e.text).map(|pos| Entity {
                    start: pos,
                    end: pos + e.text.len(),
                    text: e.text,
                    label: e.label.to_uppercase(),
                    confidence: 0.85,
                })
            })
            .collect())
    }
}

#[async_trait]
impl EntityExtractor for InferenceEntityExtractor {
    fn mode(&self) -> BackendMode {
        BackendMode::Real
    }

    async fn extract(
        &self,
        text: &str,
        language: &str,
    ) -> Result<EntityExtraction, BackendError> {
        let answer = self.client.generate(&Self::prompt(text)).await?;
        let entities = Self::parse_entities(&answer, text)?;
        Ok(EntityExtraction {
            entity_count: entities.len(),
            entities,
            language: language.to_string(),
        })
    }
}
