//! Named-entity extraction endpoint.

use std::time::Instant;

use axum::extract::State;
use axum::response::Response;
use axum::Json;

use super::{internal, respond_ok, validate_text, AppState};
use crate::models::ExtractRequest;
use crate::text::clean_text;

/// `POST /ai/extract` - extract named entities from a text.
pub async fn extract_entities(
    State(state): State<AppState>,
    Json(request): Json<ExtractRequest>,
) -> Response {
    let start = Instant::now();
    if let Some(rejection) = validate_text(&request.text, state.settings.max_text_length, start) {
        return rejection;
    }

    let max_chars = state.settings.max_text_length;
    let text = request.text;
    let cleaned = match tokio::task::spawn_blocking(move || clean_text(&text, max_chars)).await {
        Ok(cleaned) => cleaned,
        Err(e) => {
            tracing::error!(error = %e, "text cleaning task failed");
            return internal("Entity extraction failed", start);
        }
    };

    match state
        .backends
        .entities
        .extract(&cleaned, &request.language)
        .await
    {
        Ok(result) => respond_ok(
            format!("{} entities extracted", result.entity_count),
            result,
            start,
        ),
        Err(e) => {
            tracing::error!(error = %e, "entity extraction failed");
            internal("Entity extraction failed", start)
        }
    }
}
