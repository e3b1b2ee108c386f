//! Summarization endpoint.

use std::time::Instant;

use axum::extract::State;
use axum::response::Response;
use axum::Json;

use super::{internal, reject, respond_ok, validate_text, AppState};
use crate::models::SummarizeRequest;
use crate::text::clean_text;

/// Shortest text worth summarizing, in characters.
const MIN_SOURCE_CHARS: usize = 50;
/// Allowed bounds for the requested summary length.
const MAX_LENGTH_RANGE: std::ops::RangeInclusive<usize> = 50..=1000;
const MIN_LENGTH_RANGE: std::ops::RangeInclusive<usize> = 20..=500;

/// `POST /ai/summarize` - generate a bounded-length summary.
pub async fn summarize(
    State(state): State<AppState>,
    Json(request): Json<SummarizeRequest>,
) -> Response {
    let start = Instant::now();
    if let Some(rejection) = validate_text(&request.text, state.settings.max_text_length, start) {
        return rejection;
    }
    if request.text.chars().count() < MIN_SOURCE_CHARS {
        return reject(
            format!("text must be at least {} characters", MIN_SOURCE_CHARS),
            start,
        );
    }
    if !MAX_LENGTH_RANGE.contains(&request.max_length)
        || !MIN_LENGTH_RANGE.contains(&request.min_length)
    {
        return reject("summary length bounds are out of range", start);
    }

    let max_chars = state.settings.max_text_length;
    let text = request.text;
    let cleaned = match tokio::task::spawn_blocking(move || clean_text(&text, max_chars)).await {
        Ok(cleaned) => cleaned,
        Err(e) => {
            tracing::error!(error = %e, "text cleaning task failed");
            return internal("Summarization failed", start);
        }
    };

    match state
        .backends
        .summarizer
        .summarize(&cleaned, request.max_length, request.min_length)
        .await
    {
        Ok(result) => respond_ok(
            format!(
                "Summary generated ({:.0}% compression)",
                result.compression_ratio * 100.0
            ),
            result,
            start,
        ),
        Err(e) => {
            tracing::error!(error = %e, "summarization failed");
            internal("Summarization failed", start)
        }
    }
}
