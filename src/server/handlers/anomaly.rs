//! Anomaly detection endpoint.

use std::time::Instant;

use axum::extract::State;
use axum::response::Response;
use axum::Json;

use super::{internal, respond_ok, validate_text, AppState};
use crate::analysis::anomaly::{detect, DocumentMetadata};
use crate::models::AnomalyRequest;
use crate::text::clean_text;

/// `POST /ai/anomaly` - score a text plus optional metadata for anomalies.
pub async fn anomaly(
    State(state): State<AppState>,
    Json(request): Json<AnomalyRequest>,
) -> Response {
    let start = Instant::now();
    if let Some(rejection) = validate_text(&request.text, state.settings.max_text_length, start) {
        return rejection;
    }

    let max_chars = state.settings.max_text_length;
    let text = request.text;
    let metadata = DocumentMetadata::from_json_map(&request.metadata);

    // Cleaning plus scoring is pure CPU work.
    let finding = match tokio::task::spawn_blocking(move || {
        let cleaned = clean_text(&text, max_chars);
        detect(&cleaned, &metadata)
    })
    .await
    {
        Ok(finding) => finding,
        Err(e) => {
            tracing::error!(error = %e, "anomaly scoring task failed");
            return internal("Anomaly detection failed", start);
        }
    };

    let message = if finding.is_anomalous {
        format!("Anomaly detected (score={:.2})", finding.anomaly_score)
    } else {
        format!("No anomaly (score={:.2})", finding.anomaly_score)
    };
    respond_ok(message, finding, start)
}
