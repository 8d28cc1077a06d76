//! OpenAI-compatible chat completion client
//!
//! Works against any endpoint exposing `POST {base_url}/chat/completions`,
//! including Ollama's `/v1` compatibility layer.

use crate::config::LlmConfig;
use crate::errors::{PipelineError, Result};
use crate::llm::types::{ChatMessage, CompletionService};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Default completion endpoint (Ollama's OpenAI-compatible API)
pub const DEFAULT_LLM_URL: &str = "http://localhost:11434/v1";

/// Default model
pub const DEFAULT_MODEL: &str = "crewai-llama3";

/// Request timeout (5 minutes; local models can be slow on long prompts)
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Chat completion client
#[derive(Debug, Clone)]
pub struct ChatClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    temperature: Option<f32>,
}

impl ChatClient {
    /// Create client with default settings
    pub fn new() -> Result<Self> {
        Self::with_config(DEFAULT_LLM_URL, DEFAULT_MODEL)
    }

    /// Create client with custom endpoint and model
    pub fn with_config(base_url: &str, model: &str) -> Result<Self> {
        Self::build(base_url, model, REQUEST_TIMEOUT)
    }

    /// Create client from the `[llm]` configuration section
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let mut client = Self::build(
            &config.base_url,
            &config.model,
            Duration::from_secs(config.timeout_secs),
        )?;
        client.api_key = config.api_key.clone();
        client.temperature = config.temperature;
        Ok(client)
    }

    fn build(base_url: &str, model: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(PipelineError::HttpError)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: None,
            temperature: None,
        })
    }

    /// Get base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl CompletionService for ChatClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);

        let request = ChatCompletionRequest {
            model: &self.model,
            messages,
            stream: false,
            temperature: self.temperature,
        };

        debug!(model = %self.model, messages = messages.len(), "Sending completion request");

        let mut builder = self.client.post(&url).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| {
            PipelineError::service(
                "completion",
                format!("Failed to send request to {}: {}", url, e),
            )
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            warn!(%status, body = %error_text, "Completion service returned error");
            return Err(PipelineError::service(
                "completion",
                format!("HTTP {}: {}", status, error_text),
            ));
        }

        let body: ChatCompletionResponse = response.json().await.map_err(|e| {
            PipelineError::service("completion", format!("Failed to parse response: {}", e))
        })?;

        let choice = body
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| PipelineError::service("completion", "No choices in response"))?;

        Ok(choice.message.content.unwrap_or_default())
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Chat completion request body
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// Chat completion response body
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = ChatClient::new().unwrap();
        assert_eq!(client.model(), DEFAULT_MODEL);
        assert_eq!(client.base_url(), DEFAULT_LLM_URL);
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = ChatClient::with_config("http://localhost:8080/v1/", "llama3").unwrap();
        assert_eq!(client.model(), "llama3");
        assert_eq!(client.base_url(), "http://localhost:8080/v1");
    }

    #[test]
    fn test_request_serialization() {
        let messages = vec![ChatMessage::system("sys"), ChatMessage::user("hello")];
        let request = ChatCompletionRequest {
            model: "llama3",
            messages: &messages,
            stream: false,
            temperature: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "llama3");
        assert_eq!(json["stream"], false);
        assert_eq!(json["messages"][1]["content"], "hello");
        assert!(json.get("temperature").is_none());
    }

    #[test]
    fn test_response_parsing() {
        let raw = r#"{"id":"x","choices":[
            {"index":0,"message":{"role":"assistant","content":"Hi there"}}
        ]}"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("Hi there"));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_service_error() {
        // Port 1 is reserved and refuses connections
        let client = ChatClient::with_config("http://127.0.0.1:1/v1", "llama3").unwrap();
        let err = client
            .complete(&[ChatMessage::user("ping")])
            .await
            .unwrap_err();
        assert!(err.is_service_error());
    }

    #[tokio::test]
    #[ignore] // Requires Ollama running
    async fn test_complete_integration() {
        let client = ChatClient::new().unwrap();
        let reply = client.complete(&[ChatMessage::user("Say hi")]).await;
        assert!(reply.is_ok());
    }
}
