//! API-key authentication middleware.

use std::time::Duration;

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::AppState;
use crate::models::ApiResponse;

/// Check the `X-API-Key` header against the configured key.
///
/// An empty configured key disables authentication (development mode).
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if state.settings.api_key.is_empty() {
        return next.run(request).await;
    }

    let provided = request
        .headers()
        .get("x-api-key")
        .and_then(|v| v.to_str().ok());

    match provided {
        None => denied(
            StatusCode::UNAUTHORIZED,
            "Missing API key. Set the X-API-Key header.",
        ),
        Some(key) if key != state.settings.api_key => {
            denied(StatusCode::FORBIDDEN, "Invalid API key.")
        }
        Some(_) => next.run(request).await,
    }
}

fn denied(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ApiResponse::<()>::failure(message, Duration::ZERO)),
    )
        .into_response()
}
