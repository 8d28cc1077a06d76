//! Embedding service seam
//!
//! The document index never talks to an embedding model directly; it asks
//! an `Embedder`. The default implementation calls Ollama's
//! `POST /api/embeddings` endpoint.

use crate::config::EmbeddingConfig;
use crate::errors::{PipelineError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Default embedding endpoint
pub const DEFAULT_EMBEDDING_URL: &str = "http://localhost:11434";

/// Default embedding model
pub const DEFAULT_EMBEDDING_MODEL: &str = "all-minilm";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Turns text into a dense vector
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate embedding for a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts, in order
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(text).await?);
        }
        Ok(embeddings)
    }

    /// Model identifier; part of the index cache key
    fn model(&self) -> &str;
}

/// Embedder backed by a local Ollama server
#[derive(Debug, Clone)]
pub struct OllamaEmbedder {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaEmbedder {
    /// Create embedder with custom endpoint and model
    pub fn new(base_url: &str, model: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(PipelineError::HttpError)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    /// Create embedder from the `[embedding]` configuration section
    pub fn from_config(config: &EmbeddingConfig) -> Result<Self> {
        Self::new(&config.base_url, &config.model)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/api/embeddings", self.base_url);

        let request = EmbeddingRequest {
            model: &self.model,
            prompt: text,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                PipelineError::service(
                    "embedding",
                    format!("Failed to send request to {}: {}", url, e),
                )
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(PipelineError::service(
                "embedding",
                format!("HTTP {}: {}", status, error_text),
            ));
        }

        let body: EmbeddingResponse = response.json().await.map_err(|e| {
            PipelineError::service("embedding", format!("Failed to parse response: {}", e))
        })?;

        if body.embedding.is_empty() {
            return Err(PipelineError::service(
                "embedding",
                format!("Model '{}' returned an empty embedding", self.model),
            ));
        }

        debug!(model = %self.model, dim = body.embedding.len(), "Embedded text");
        Ok(body.embedding)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    #[serde(default)]
    embedding: Vec<f32>,
}
