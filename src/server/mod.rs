//! HTTP service exposing the analysis pipeline.
//!
//! All endpoints return the uniform [`ApiResponse`](crate::models::ApiResponse)
//! envelope. Backends are initialized once before the server starts; request
//! handlers only ever see the shared [`AppState`].

mod auth;
mod handlers;
mod routes;

pub use routes::create_router;

use std::net::SocketAddr;
use std::sync::Arc;

use crate::analysis::Pipeline;
use crate::backends::BackendSet;
use crate::config::Settings;
use crate::search::RankingEngine;
use crate::storage::FsObjectStore;

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub backends: Arc<BackendSet>,
    pub ranker: Arc<RankingEngine>,
    pub pipeline: Arc<Pipeline>,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(settings: Arc<Settings>, backends: Arc<BackendSet>) -> Self {
        let store = Arc::new(FsObjectStore::new(settings.documents_dir.clone()));
        let ranker = Arc::new(RankingEngine::from_embedder(backends.embedder.clone()));
        let pipeline = Arc::new(Pipeline::new(
            backends.clone(),
            store,
            settings.clone(),
        ));
        Self {
            backends,
            ranker,
            pipeline,
            settings,
        }
    }
}

/// Initialize backends and run the HTTP server.
pub async fn serve(settings: Settings, host: &str, port: u16) -> anyhow::Result<()> {
    let settings = Arc::new(settings);
    let backends = Arc::new(BackendSet::load(&settings).await);
    for (capability, mode) in backends.modes() {
        tracing::info!(capability, mode = %mode, "backend ready");
    }

    let state = AppState::new(settings, backends);
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!("starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn test_state(settings: Settings) -> AppState {
        let settings = Arc::new(settings);
        let backends = Arc::new(BackendSet::simulated(&settings));
        AppState::new(settings, backends)
    }

    fn test_app() -> axum::Router {
        create_router(test_state(Settings::default()))
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn health_reports_backend_modes() {
        let response = test_app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["backends"]["classifier"], "simulated");
        assert_eq!(json["backends"]["ocr"], "simulated");
    }

    #[tokio::test]
    async fn classify_returns_envelope_with_category() {
        let response = test_app()
            .oneshot(post_json(
                "/ai/classify",
                r#"{"text": "The annual budget allocates expenditure across fiscal quarters."}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["category"], "BUDGET");
        assert!(json["processing_time_ms"].is_number());
    }

    #[tokio::test]
    async fn classify_rejects_empty_text() {
        let response = test_app()
            .oneshot(post_json("/ai/classify", r#"{"text": "   "}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["success"], false);
    }

    #[tokio::test]
    async fn classify_rejects_oversized_text() {
        let big = "a".repeat(100_001);
        let body = serde_json::json!({ "text": big }).to_string();
        let response = test_app()
            .oneshot(post_json("/ai/classify", &body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn extract_counts_entities() {
        let response = test_app()
            .oneshot(post_json(
                "/ai/extract",
                r#"{"text": "Invoice No. 2024/117 issued on 12/03/2024.", "language": "en"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["success"], true);
        assert!(json["data"]["entity_count"].as_u64().unwrap() >= 2);
    }

    #[tokio::test]
    async fn summarize_rejects_short_text() {
        let response = test_app()
            .oneshot(post_json("/ai/summarize", r#"{"text": "too short"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn summarize_returns_summary_with_stats() {
        let text = "First sentence of the document. Second sentence with more detail. \
                    Third sentence wrapping up the topic."
            .to_string();
        let body = serde_json::json!({ "text": text }).to_string();
        let response = test_app()
            .oneshot(post_json("/ai/summarize", &body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["success"], true);
        assert!(json["data"]["summary"].as_str().unwrap().len() > 0);
        assert!(json["data"]["compression_ratio"].is_number());
    }

    #[tokio::test]
    async fn search_with_no_documents_returns_empty_total() {
        let response = test_app()
            .oneshot(post_json(
                "/ai/search",
                r#"{"query": "anything", "documents": []}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["total"], 0);
        assert_eq!(json["data"]["results"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn search_rejects_oversized_candidate_set() {
        let docs: Vec<serde_json::Value> = (0..501)
            .map(|i| serde_json::json!({"id": i.to_string(), "text": "text"}))
            .collect();
        let body = serde_json::json!({"query": "q", "documents": docs}).to_string();
        let response = test_app()
            .oneshot(post_json("/ai/search", &body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn search_rejects_out_of_range_top_k() {
        let body = r#"{"query": "q", "documents": [{"id": "1", "text": "t"}], "top_k": 0}"#;
        let response = test_app()
            .oneshot(post_json("/ai/search", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = r#"{"query": "q", "documents": [{"id": "1", "text": "t"}], "top_k": 51}"#;
        let response = test_app()
            .oneshot(post_json("/ai/search", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn anomaly_flags_short_text() {
        let response = test_app()
            .oneshot(post_json("/ai/anomaly", r#"{"text": "tiny"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["is_anomalous"], true);
        assert_eq!(json["data"]["severity"], "MEDIUM");
    }

    #[tokio::test]
    async fn analyze_with_invalid_uuid_fails_without_fetch() {
        let response = test_app()
            .oneshot(post_json(
                "/analyze",
                r#"{"documentId": "not-a-uuid", "storageKey": "docs/a.pdf"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert!(json["message"].as_str().unwrap().contains("UUID"));
    }

    #[tokio::test]
    async fn ocr_accepts_multipart_image() {
        let boundary = "TESTBOUNDARY";
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"scan.png\"\r\n\
             Content-Type: image/png\r\n\r\nfake image bytes\r\n--{b}--\r\n",
            b = boundary
        );
        let request = Request::builder()
            .method("POST")
            .uri("/ai/ocr")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();

        let response = test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["pages"], 1);
        assert!(json["data"]["text"].as_str().unwrap().contains("SCANNED"));
    }

    #[tokio::test]
    async fn ocr_rejects_unsupported_content_type() {
        let boundary = "TESTBOUNDARY";
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"a.zip\"\r\n\
             Content-Type: application/zip\r\n\r\nzipbytes\r\n--{b}--\r\n",
            b = boundary
        );
        let request = Request::builder()
            .method("POST")
            .uri("/ai/ocr")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();

        let response = test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn api_key_is_enforced_when_configured() {
        let settings = Settings {
            api_key: "sekrit".to_string(),
            ..Settings::default()
        };
        let app = create_router(test_state(settings));

        // Missing key
        let response = app
            .clone()
            .oneshot(post_json("/ai/classify", r#"{"text": "hello there"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        // Wrong key
        let mut request = post_json("/ai/classify", r#"{"text": "hello there"}"#);
        request
            .headers_mut()
            .insert("x-api-key", "wrong".parse().unwrap());
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        // Correct key
        let mut request = post_json("/ai/classify", r#"{"text": "hello there"}"#);
        request
            .headers_mut()
            .insert("x-api-key", "sekrit".parse().unwrap());
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // Health stays open
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
