//! Text normalization applied ahead of every NLP backend.

pub mod language;

use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://\S+").unwrap()
});

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\S+@\S+\.\S+").unwrap()
});

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s+").unwrap()
});

/// Strip Unicode control characters, keeping line and tab structure.
pub fn remove_control_characters(text: &str) -> String {
    text.chars()
        .filter(|&ch| !ch.is_control() || matches!(ch, '\n' | '\r' | '\t'))
        .collect()
}

/// Canonical NFC composition, so accented characters compare consistently.
pub fn normalize_unicode(text: &str) -> String {
    text.nfc().collect()
}

/// Remove HTTP(S) URLs.
pub fn strip_urls(text: &str) -> String {
    URL_RE.replace_all(text, "").into_owned()
}

/// Remove email addresses.
pub fn strip_emails(text: &str) -> String {
    EMAIL_RE.replace_all(text, "").into_owned()
}

/// Collapse runs of whitespace into single spaces and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text, " ").trim().to_string()
}

/// Truncate to at most `max_chars` characters, cutting at the last space
/// when one exists inside the window.
pub fn truncate_at_word(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let truncated: String = text.chars().take(max_chars).collect();
    match truncated.rfind(' ') {
        Some(pos) if pos > 0 => truncated[..pos].to_string(),
        _ => truncated,
    }
}

/// Full cleaning pipeline: control characters, NFC, URLs/emails, whitespace,
/// truncation. The result is what every NLP backend receives.
pub fn clean_text(text: &str, max_chars: usize) -> String {
    let text = remove_control_characters(text);
    let text = normalize_unicode(&text);
    let text = strip_urls(&text);
    let text = strip_emails(&text);
    let text = collapse_whitespace(&text);
    truncate_at_word(&text, max_chars)
}

/// Split text into sentences, keeping terminal punctuation.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        current.push(ch);
        if matches!(ch, '.' | '!' | '?') && chars.peek().map_or(true, |c| c.is_whitespace()) {
            let sentence = current.trim();
            if !sentence.is_empty() {
                sentences.push(sentence.to_string());
            }
            current.clear();
        }
    }

    let tail = current.trim();
    if !tail.is_empty() {
        sentences.push(tail.to_string());
    }
    sentences
}
