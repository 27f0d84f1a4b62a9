//! Chat-completions client for an OpenAI-compatible endpoint (Groq by default).
//!
//! One request per call: no retries, no streaming.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::LlmConfig;
use crate::error::ApiError;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("language model API key not configured")]
    NotConfigured,
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("empty response")]
    EmptyChoices,
}

impl From<LlmError> for ApiError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::NotConfigured => ApiError::BadRequest(LlmError::NotConfigured.to_string()),
            other => ApiError::Upstream(other.to_string()),
        }
    }
}

/// A single-prompt completion request
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub prompt: String,
    pub max_tokens: u32,
}

/// Anything that can turn a prompt into text
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Whether requests can be made at all (e.g. an API key is present)
    fn is_available(&self) -> bool;

    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// HTTP client for `/chat/completions`
#[derive(Clone)]
pub struct ChatCompletionsClient {
    config: LlmConfig,
    client: reqwest::Client,
}

impl ChatCompletionsClient {
    pub fn new(config: LlmConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self { config, client }
    }

    fn api_key(&self) -> Option<&str> {
        self.config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
    }
}

#[async_trait]
impl CompletionClient for ChatCompletionsClient {
    fn is_available(&self) -> bool {
        self.api_key().is_some() && !self.config.model.trim().is_empty()
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let api_key = self.api_key().ok_or(LlmError::NotConfigured)?;
        let url = format!(
            "{}/chat/completions",
            self.config.api_endpoint.trim_end_matches('/')
        );

        let payload = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: request.prompt.clone(),
            }],
            temperature: self.config.temperature,
            max_tokens: request.max_tokens,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%status, "language model request rejected");
            return Err(LlmError::HttpStatus { status, body });
        }

        let parsed: ChatResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.trim().to_string())
            .ok_or(LlmError::EmptyChoices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_is_unavailable() {
        let client = ChatCompletionsClient::new(LlmConfig::default());
        assert!(!client.is_available());
    }

    #[test]
    fn blank_key_is_unavailable() {
        let client = ChatCompletionsClient::new(LlmConfig {
            api_key: Some("   ".to_string()),
            ..Default::default()
        });
        assert!(!client.is_available());
    }

    #[test]
    fn configured_key_is_available() {
        let client = ChatCompletionsClient::new(LlmConfig {
            api_key: Some("gsk_test".to_string()),
            ..Default::default()
        });
        assert!(client.is_available());
    }

    #[tokio::test]
    async fn complete_without_key_fails_fast() {
        let client = ChatCompletionsClient::new(LlmConfig::default());
        let request = CompletionRequest {
            prompt: "hi".to_string(),
            max_tokens: 10,
        };
        assert!(matches!(
            client.complete(&request).await,
            Err(LlmError::NotConfigured)
        ));
    }

    #[test]
    fn not_configured_maps_to_bad_request() {
        let err: ApiError = LlmError::NotConfigured.into();
        assert!(matches!(err, ApiError::BadRequest(_)));
        let err: ApiError = LlmError::EmptyChoices.into();
        assert!(matches!(err, ApiError::Upstream(_)));
    }
}
