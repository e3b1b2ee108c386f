//! Best-effort language detection.
//!
//! Deterministic heuristics only: script ranges for Arabic and Cyrillic,
//! stopword frequency for Latin-script languages. Detection never fails —
//! low-confidence inputs resolve to the caller's default code.

/// Inputs shorter than this are too small to detect reliably.
pub const MIN_DETECTABLE_CHARS: usize = 20;

/// Fraction of words that must be known stopwords before a Latin-script
/// guess is trusted.
const STOPWORD_CONFIDENCE_FLOOR: f32 = 0.12;

/// A detected language code plus a confidence indicator.
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageGuess {
    /// ISO 639-1 code.
    pub code: String,
    /// Confidence in [0, 1]; 0.0 means the default was used.
    pub confidence: f32,
}

const EN_STOPWORDS: &[&str] = &[
    "the", "and", "of", "to", "in", "is", "that", "for", "with", "was", "are", "this", "not",
];
const FR_STOPWORDS: &[&str] = &[
    "le", "la", "les", "de", "des", "et", "un", "une", "est", "dans", "pour", "que", "pas",
];
const ES_STOPWORDS: &[&str] = &[
    "el", "la", "los", "las", "de", "y", "un", "una", "es", "en", "por", "que", "no",
];
const DE_STOPWORDS: &[&str] = &[
    "der", "die", "das", "und", "ein", "eine", "ist", "nicht", "mit", "von", "für", "auf",
];

const LATIN_PROFILES: &[(&str, &[&str])] = &[
    ("en", EN_STOPWORDS),
    ("fr", FR_STOPWORDS),
    ("es", ES_STOPWORDS),
    ("de", DE_STOPWORDS),
];

/// Detect the dominant language of a text.
///
/// Returns `default` with zero confidence when the text is too short or no
/// heuristic clears its floor.
pub fn detect_language(text: &str, default: &str) -> LanguageGuess {
    let trimmed = text.trim();
    if trimmed.chars().count() < MIN_DETECTABLE_CHARS {
        return LanguageGuess {
            code: default.to_string(),
            confidence: 0.0,
        };
    }

    // Non-Latin scripts are unambiguous enough to decide on ratio alone.
    let letters: Vec<char> = trimmed.chars().filter(|c| c.is_alphabetic()).collect();
    if !letters.is_empty() {
        let arabic = letters.iter().filter(|c| is_arabic(**c)).count();
        let cyrillic = letters.iter().filter(|c| is_cyrillic(**c)).count();
        let arabic_ratio = arabic as f32 / letters.len() as f32;
        let cyrillic_ratio = cyrillic as f32 / letters.len() as f32;
        if arabic_ratio > 0.5 {
            return LanguageGuess {
                code: "ar".to_string(),
                confidence: arabic_ratio,
            };
        }
        if cyrillic_ratio > 0.5 {
            return LanguageGuess {
                code: "ru".to_string(),
                confidence: cyrillic_ratio,
            };
        }
    }

    match best_latin_profile(trimmed) {
        Some((code, ratio)) if ratio >= STOPWORD_CONFIDENCE_FLOOR => LanguageGuess {
            code: code.to_string(),
            confidence: ratio.min(1.0),
        },
        _ => LanguageGuess {
            code: default.to_string(),
            confidence: 0.0,
        },
    }
}

/// Stopword-hit ratios for every profiled language, best first.
pub fn language_probabilities(text: &str, default: &str) -> Vec<(String, f32)> {
    let guess = detect_language(text, default);
    if guess.confidence == 0.0 {
        return vec![(guess.code, 1.0)];
    }

    let words = lowercase_words(text);
    let mut scored: Vec<(String, f32)> = LATIN_PROFILES
        .iter()
        .map(|(code, stopwords)| (code.to_string(), stopword_ratio(&words, stopwords)))
        .filter(|(_, ratio)| *ratio > 0.0)
        .collect();
    if scored.is_empty() {
        return vec![(guess.code, guess.confidence)];
    }
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    scored
}

fn best_latin_profile(text: &str) -> Option<(&'static str, f32)> {
    let words = lowercase_words(text);
    if words.is_empty() {
        return None;
    }
    LATIN_PROFILES
        .iter()
        .map(|(code, stopwords)| (*code, stopword_ratio(&words, stopwords)))
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
}

fn lowercase_words(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|w| {
            w.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|w| !w.is_empty())
        .collect()
}

fn stopword_ratio(words: &[String], stopwords: &[&str]) -> f32 {
    if words.is_empty() {
        return 0.0;
    }
    let hits = words
        .iter()
        .filter(|w| stopwords.contains(&w.as_str()))
        .count();
    hits as f32 / words.len() as f32
}

fn is_arabic(c: char) -> bool {
    matches!(c, '\u{0600}'..='\u{06FF}' | '\u{0750}'..='\u{077F}')
}

fn is_cyrillic(c: char) -> bool {
    matches!(c, '\u{0400}'..='\u{04FF}')
}
