//! Request handlers.

mod analyze;
mod anomaly;
mod classify;
mod entities;
mod ocr;
mod search;
mod summarize;

pub use analyze::analyze;
pub use anomaly::anomaly;
pub use classify::classify;
pub use entities::extract_entities;
pub use ocr::ocr;
pub use search::search;
pub use summarize::summarize;

use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;

use super::AppState;
use crate::models::ApiResponse;

/// Health check endpoint, reporting which backend mode each capability runs in.
pub async fn health(State(state): State<AppState>) -> Response {
    let backends: serde_json::Map<String, serde_json::Value> = state
        .backends
        .modes()
        .into_iter()
        .map(|(capability, mode)| (capability.to_string(), json!(mode.as_str())))
        .collect();

    Json(json!({
        "status": "ok",
        "service": "docsight",
        "version": env!("CARGO_PKG_VERSION"),
        "search_mode": state.ranker.mode().as_str(),
        "backends": backends,
    }))
    .into_response()
}

/// Wrap a successful payload in the envelope.
pub(super) fn respond_ok<T: Serialize>(
    message: impl Into<String>,
    data: T,
    start: Instant,
) -> Response {
    (
        StatusCode::OK,
        Json(ApiResponse::ok(message, data, start.elapsed())),
    )
        .into_response()
}

/// Validation rejection with a specific, user-facing message.
pub(super) fn reject(message: impl Into<String>, start: Instant) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::<()>::failure(message, start.elapsed())),
    )
        .into_response()
}

/// Generic internal failure; the message never carries internal detail.
pub(super) fn internal(message: &str, start: Instant) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::<()>::failure(message, start.elapsed())),
    )
        .into_response()
}

/// Boundary validation shared by all text endpoints.
pub(super) fn validate_text(text: &str, max_chars: usize, start: Instant) -> Option<Response> {
    if text.trim().is_empty() {
        return Some(reject("text must not be empty", start));
    }
    if text.chars().count() > max_chars {
        return Some(reject(
            format!("text exceeds the {} character limit", max_chars),
            start,
        ));
    }
    None
}
