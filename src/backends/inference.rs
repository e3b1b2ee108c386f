//! HTTP client for an Ollama-compatible inference service.
//!
//! All real language capabilities (classification, entity extraction,
//! summarization, embeddings) share one client instance, created and probed
//! once at load time.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::BackendError;

/// Generation is deliberately conservative: analysis output should be stable.
const GENERATION_TEMPERATURE: f32 = 0.1;
const GENERATION_MAX_TOKENS: u32 = 512;

/// Shared client for the inference service.
pub struct InferenceClient {
    endpoint: String,
    model: String,
    embed_model: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    embedding: Vec<f32>,
}

impl InferenceClient {
    /// Create a client for the given endpoint and models.
    pub fn new(
        endpoint: String,
        model: String,
        embed_model: String,
    ) -> Result<Self, BackendError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| BackendError::Unavailable(format!("HTTP client build failed: {e}")))?;

        Ok(Self {
            endpoint,
            model,
            embed_model,
            client,
        })
    }

    /// Probe whether the inference service answers at all.
    pub async fn is_available(&self) -> bool {
        let url = format!("{}/api/tags", self.endpoint);
        match self
            .client
            .get(&url)
            .timeout(Duration::from_secs(3))
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    /// Run one non-streaming generation request.
    pub async fn generate(&self, prompt: &str) -> Result<String, BackendError> {
        let url = format!("{}/api/generate", self.endpoint);
        debug!(model = %self.model, prompt_chars = prompt.chars().count(), "inference request");

        let resp = self
            .client
            .post(&url)
            .json(&GenerateRequest {
                model: &self.model,
                prompt,
                stream: false,
                options: GenerateOptions {
                    temperature: GENERATION_TEMPERATURE,
                    num_predict: GENERATION_MAX_TOKENS,
                },
            })
            .send()
            .await
            .map_err(|e| BackendError::Api(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(BackendError::Api(format!("HTTP {}", resp.status())));
        }

        let body: GenerateResponse = resp
            .json()
            .await
            .map_err(|e| BackendError::Parse(e.to_string()))?;

        Ok(body.response)
    }

    /// Encode one text into an embedding vector.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, BackendError> {
        let url = format!("{}/api/embeddings", self.endpoint);

        let resp = self
            .client
            .post(&url)
            .json(&EmbeddingsRequest {
                model: &self.embed_model,
                prompt: text,
            })
            .send()
            .await
            .map_err(|e| BackendError::Api(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(BackendError::Api(format!("HTTP {}", resp.status())));
        }

        let body: EmbeddingsResponse = resp
            .json()
            .await
            .map_err(|e| BackendError::Parse(e.to_string()))?;

        if body.embedding.is_empty() {
            return Err(BackendError::Parse("empty embedding vector".to_string()));
        }
        Ok(body.embedding)
    }
}
