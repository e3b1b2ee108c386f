//! Text classification endpoint.

use std::time::Instant;

use axum::extract::State;
use axum::response::Response;
use axum::Json;

use super::{internal, respond_ok, validate_text, AppState};
use crate::models::ClassifyRequest;
use crate::text::clean_text;

/// `POST /ai/classify` - assign a category to a text.
pub async fn classify(
    State(state): State<AppState>,
    Json(request): Json<ClassifyRequest>,
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
            return internal("Classification failed", start);
        }
    };

    match state.backends.classifier.classify(&cleaned).await {
        Ok(result) => respond_ok(
            format!("Classification completed: {}", result.category),
            result,
            start,
        ),
        Err(e) => {
            tracing::error!(error = %e, "classification failed");
            internal("Classification failed", start)
        }
    }
}
