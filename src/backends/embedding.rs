//! Embedding backend for vector search ranking.

use std::sync::Arc;

use async_trait::async_trait;

use super::{BackendError, Embedder, InferenceClient};

/// Real embedder backed by the inference service.
///
/// There is no simulated counterpart: when this backend is unavailable the
/// ranking engine switches to its lexical strategy instead.
pub struct InferenceEmbedder {
    client: Arc<InferenceClient>,
}

impl InferenceEmbedder {
    pub fn new(client: Arc<InferenceClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Embedder for InferenceEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, BackendError> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.client.embed(text).await?);
        }
        Ok(vectors)
    }
}
