//! OpenAI-compatible chat completions client
//!
//! Works against any `/chat/completions` endpoint that honours
//! `response_format` (Groq, OpenAI, vLLM). Schema-constrained decoding is
//! only offered for some hosted models; others need [`ResponseMode::JsonObject`].

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use crate::errors::{synthesis_transport_error, SynthesisError};
use crate::models::client::{parse_structured_reply, GenerativeModel, StructuredRequest};
use crate::models::types::{
    ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ResponseFormat, ResponseMode,
};

/// Default endpoint (Groq's OpenAI-compatible API)
pub const DEFAULT_OPENAI_URL: &str = "https://api.groq.com/openai/v1";

/// Default hosted model; supports strict `json_schema` output on Groq
pub const DEFAULT_OPENAI_MODEL: &str = "openai/gpt-oss-20b";

/// Schema name reported to the provider
const SCHEMA_NAME: &str = "assessment";

/// Request timeout (60 seconds)
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Chat completions client
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
    timeout: Duration,
    response_mode: ResponseMode,
    strict: bool,
}

impl OpenAiClient {
    pub fn new(api_key: &str) -> Result<Self, SynthesisError> {
        Self::with_config(DEFAULT_OPENAI_URL, DEFAULT_OPENAI_MODEL, api_key, REQUEST_TIMEOUT)
    }

    pub fn with_config(
        base_url: &str,
        model: &str,
        api_key: &str,
        timeout: Duration,
    ) -> Result<Self, SynthesisError> {
        if api_key.trim().is_empty() {
            return Err(SynthesisError::Config("model API key is not set".to_string()));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SynthesisError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
            timeout,
            response_mode: ResponseMode::JsonSchema,
            strict: true,
        })
    }

    /// Choose how structured output is requested
    ///
    /// `strict` only applies to [`ResponseMode::JsonSchema`].
    pub fn with_response_mode(mut self, mode: ResponseMode, strict: bool) -> Self {
        self.response_mode = mode;
        self.strict = strict;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn response_mode(&self) -> ResponseMode {
        self.response_mode
    }

    pub(crate) fn build_request(&self, request: &StructuredRequest) -> ChatCompletionRequest {
        let (system, response_format) = match self.response_mode {
            ResponseMode::JsonSchema => (
                request.system.clone(),
                ResponseFormat::json_schema(SCHEMA_NAME, request.schema.clone(), self.strict),
            ),
            ResponseMode::JsonObject => (
                format!(
                    "{}\n\nRespond with a single JSON object matching this JSON schema:\n{}",
                    request.system, request.schema
                ),
                ResponseFormat::json_object(),
            ),
        };

        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::system(system), ChatMessage::user(request.user.clone())],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            response_format,
        }
    }
}

#[async_trait]
impl GenerativeModel for OpenAiClient {
    async fn generate(&self, request: &StructuredRequest) -> Result<Value, SynthesisError> {
        let url = format!("{}/chat/completions", self.base_url);
        let timeout_ms = self.timeout.as_millis() as u64;

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
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

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| synthesis_transport_error(e, timeout_ms))?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| SynthesisError::NonConformant("reply has no message content".to_string()))?;

        parse_structured_reply(&content)
    }

    fn name(&self) -> &str {
        &self.model
    }
}
