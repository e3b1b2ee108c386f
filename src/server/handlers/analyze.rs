//! Full-pipeline analysis endpoint.

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::AppState;
use crate::models::AnalyzeRequest;

/// `POST /analyze` - run the complete pipeline for a stored document.
///
/// The pipeline reports its own outcome through the envelope's `success`
/// flag, so this endpoint always answers 200 to the upstream service.
pub async fn analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Response {
    let response = state
        .pipeline
        .analyze_document(&request.document_id, &request.storage_key)
        .await;
    Json(response).into_response()
}
