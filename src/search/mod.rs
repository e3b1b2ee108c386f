//! Search ranking engine.
//!
//! Scores a query against a bounded candidate set with one of two
//! interchangeable strategies behind the same contract: cosine similarity
//! over embedding vectors when a real embedder is available, lexical Jaccard
//! overlap otherwise. Both produce the same output shape, sorted by
//! descending score with ties kept in candidate order.

use std::collections::HashSet;
use std::sync::Arc;

use crate::backends::{BackendError, BackendMode, Embedder};
use crate::models::{SearchCandidate, SearchHit, SearchOutcome};

/// Candidate set ceiling per request, enforced at the boundary.
pub const MAX_CANDIDATES: usize = 500;
/// Allowed range for `top_k`.
pub const TOP_K_MIN: usize = 1;
pub const TOP_K_MAX: usize = 50;
/// Snippet length in characters.
const SNIPPET_CHARS: usize = 200;

/// Ranking engine with its strategy fixed at load time.
pub struct RankingEngine {
    strategy: Strategy,
}

enum Strategy {
    /// Cosine similarity over unit-normalized embedding vectors.
    Vector(Arc<dyn Embedder>),
    /// Jaccard similarity over lowercased word sets.
    Lexical,
}

impl RankingEngine {
    pub fn vector(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            strategy: Strategy::Vector(embedder),
        }
    }

    pub fn lexical() -> Self {
        Self {
            strategy: Strategy::Lexical,
        }
    }

    /// Build the engine matching an optional embedder.
    pub fn from_embedder(embedder: Option<Arc<dyn Embedder>>) -> Self {
        match embedder {
            Some(embedder) => Self::vector(embedder),
            None => Self::lexical(),
        }
    }

    pub fn mode(&self) -> BackendMode {
        match self.strategy {
            Strategy::Vector(_) => BackendMode::Real,
            Strategy::Lexical => BackendMode::Simulated,
        }
    }

    /// Rank candidates against a query.
    ///
    /// Empty candidate sets produce an empty result, not an error. Hits with
    /// non-positive scores are never returned.
    pub async fn rank(
        &self,
        query: &str,
        candidates: &[SearchCandidate],
        top_k: usize,
    ) -> Result<SearchOutcome, BackendError> {
        if candidates.is_empty() {
            return Ok(SearchOutcome {
                query: query.to_string(),
                results: Vec::new(),
                total: 0,
            });
        }

        let scored = match &self.strategy {
            Strategy::Vector(embedder) => {
                vector_scores(embedder.as_ref(), query, candidates).await?
            }
            Strategy::Lexical => lexical_scores(query, candidates),
        };

        Ok(build_outcome(query, candidates, scored, top_k))
    }
}

/// Assemble the outcome from per-candidate scores: stable-sort descending,
/// cut to `top_k`, drop non-positive scores.
fn build_outcome(
    query: &str,
    candidates: &[SearchCandidate],
    scores: Vec<f32>,
    top_k: usize,
) -> SearchOutcome {
    let mut ranked: Vec<(usize, f32)> = scores.into_iter().enumerate().collect();
    // Stable sort keeps ties in candidate order.
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let results: Vec<SearchHit> = ranked
        .into_iter()
        .take(top_k)
        .filter(|(_, score)| *score > 0.0)
        .map(|(idx, score)| SearchHit {
            document_id: candidates[idx].id.clone(),
            score: round4(score),
            snippet: candidates[idx].text.chars().take(SNIPPET_CHARS).collect(),
        })
        .collect();

    SearchOutcome {
        query: query.to_string(),
        total: results.len(),
        results,
    }
}

async fn vector_scores(
    embedder: &dyn Embedder,
    query: &str,
    candidates: &[SearchCandidate],
) -> Result<Vec<f32>, BackendError> {
    let mut texts: Vec<String> = Vec::with_capacity(candidates.len() + 1);
    texts.push(query.to_string());
    texts.extend(candidates.iter().map(|c| c.text.clone()));

    let mut vectors = embedder.embed(&texts).await?;
    if vectors.len() != candidates.len() + 1 {
        return Err(BackendError::Parse(format!(
            "embedder returned {} vectors for {} texts",
            vectors.len(),
            texts.len()
        )));
    }

    let query_vec = normalize(vectors.remove(0));
    Ok(vectors
        .into_iter()
        .map(|v| dot(&query_vec, &normalize(v)))
        .collect())
}

fn lexical_scores(query: &str, candidates: &[SearchCandidate]) -> Vec<f32> {
    let query_words = word_set(query);
    candidates
        .iter()
        .map(|candidate| {
            let doc_words = word_set(&candidate.text);
            if doc_words.is_empty() {
                return 0.0;
            }
            let intersection = query_words.intersection(&doc_words).count();
            let union = query_words.union(&doc_words).count();
            if union == 0 {
                0.0
            } else {
                intersection as f32 / union as f32
            }
        })
        .collect()
}

fn word_set(text: &str) -> HashSet<String> {
    text.split_whitespace().map(|w| w.to_lowercase()).collect()
}

fn normalize(mut v: Vec<f32>) -> Vec<f32> {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in &mut v {
            *x /= norm;
        }
    }
    v
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

fn round4(value: f32) -> f32 {
    (value * 10_000.0).round() / 10_000.0
}
