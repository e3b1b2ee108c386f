//! Search ranking endpoint.

use std::time::Instant;

use axum::extract::State;
use axum::response::Response;
use axum::Json;

use super::{internal, reject, respond_ok, AppState};
use crate::models::SearchRequest;
use crate::search::{MAX_CANDIDATES, TOP_K_MAX, TOP_K_MIN};

/// Query length ceiling, in characters.
const MAX_QUERY_CHARS: usize = 1000;

/// `POST /ai/search` - rank candidate documents against a query.
pub async fn search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Response {
    let start = Instant::now();

    if request.query.trim().is_empty() {
        return reject("query must not be empty", start);
    }
    if request.query.chars().count() > MAX_QUERY_CHARS {
        return reject(
            format!("query exceeds the {} character limit", MAX_QUERY_CHARS),
            start,
        );
    }
    if request.documents.len() > MAX_CANDIDATES {
        return reject(
            format!("at most {} documents per search", MAX_CANDIDATES),
            start,
        );
    }
    if !(TOP_K_MIN..=TOP_K_MAX).contains(&request.top_k) {
        return reject(
            format!("top_k must be between {} and {}", TOP_K_MIN, TOP_K_MAX),
            start,
        );
    }

    match state
        .ranker
        .rank(&request.query, &request.documents, request.top_k)
        .await
    {
        Ok(outcome) => respond_ok(
            format!("{} result(s) found", outcome.total),
            outcome,
            start,
        ),
        Err(e) => {
            tracing::error!(error = %e, "search ranking failed");
            internal("Search failed", start)
        }
    }
}
