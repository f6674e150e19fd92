//! Ollama chat client with JSON-schema constrained output
//!
//! - Endpoint: POST /api/chat, non-streaming
//! - The assessment schema goes in `format`, so decoding is grammar-constrained

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use crate::errors::{synthesis_transport_error, SynthesisError};
use crate::models::client::{parse_structured_reply, GenerativeModel, StructuredRequest};
use crate::models::types::{ChatMessage, OllamaChatRequest, OllamaChatResponse, OllamaOptions};

/// Default Ollama API endpoint
pub const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";

/// Default model
pub const DEFAULT_MODEL: &str = "qwen2.5:7b-instruct";

/// Request timeout (120 seconds, local models can be slow to load)
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Ollama chat client
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
    timeout: Duration,
}

impl OllamaClient {
    /// Create new Ollama client with default settings
    pub fn new() -> Result<Self, SynthesisError> {
        Self::with_config(DEFAULT_OLLAMA_URL, DEFAULT_MODEL, REQUEST_TIMEOUT)
    }

    /// Create Ollama client with custom configuration
    pub fn with_config(base_url: &str, model: &str, timeout: Duration) -> Result<Self, SynthesisError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SynthesisError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            timeout,
        })
    }

    /// Get base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn build_request(&self, request: &StructuredRequest) -> OllamaChatRequest {
        OllamaChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(request.system.clone()),
                ChatMessage::user(request.user.clone()),
            ],
            stream: false,
            format: request.schema.clone(),
            options: OllamaOptions {
                temperature: request.temperature,
                num_predict: request.max_tokens,
            },
        }
    }
}

#[async_trait]
impl GenerativeModel for OllamaClient {
    async fn generate(&self, request: &StructuredRequest) -> Result<Value, SynthesisError> {
        let url = format!("{}/api/chat", self.base_url);
        let timeout_ms = self.timeout.as_millis() as u64;

        let response = self
            .client
            .post(&url)
            .json(&self.build_request(request))
            .send()
            .await
            .map_err(|e| synthesis_transport_error(e, timeout_ms))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(SynthesisError::Api {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let chat: OllamaChatResponse = response
            .json()
            .await
            .map_err(|e| synthesis_transport_error(e, timeout_ms))?;

        parse_structured_reply(&chat.message.content)
    }

    fn name(&self) -> &str {
        &self.model
    }
}
