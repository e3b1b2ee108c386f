//! Router configuration for the analysis service.

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use super::auth;
use super::handlers;
use super::AppState;

/// Multipart framing overhead allowed on top of the file size limit.
const UPLOAD_OVERHEAD_BYTES: usize = 64 * 1024;

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    let body_limit = state.settings.max_file_size_bytes() as usize + UPLOAD_OVERHEAD_BYTES;

    Router::new()
        // Full pipeline
        .route("/analyze", post(handlers::analyze))
        // Per-capability endpoints
        .route("/ai/classify", post(handlers::classify))
        .route("/ai/extract", post(handlers::extract_entities))
        .route("/ai/summarize", post(handlers::summarize))
        .route("/ai/ocr", post(handlers::ocr))
        .route("/ai/search", post(handlers::search))
        .route("/ai/anomaly", post(handlers::anomaly))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_api_key,
        ))
        // Health stays unauthenticated for container orchestration
        .route("/health", get(handlers::health))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
