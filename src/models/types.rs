//! Wire types for the supported model endpoints
//!
//! Only the fields the synthesizer needs are modelled; everything else in
//! the provider responses is ignored.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Model provider selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelProvider {
    /// Local Ollama server, `/api/chat`
    Ollama,
    /// Any OpenAI-compatible `/chat/completions` endpoint (Groq, OpenAI, vLLM)
    OpenAi,
}

impl fmt::Display for ModelProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelProvider::Ollama => write!(f, "ollama"),
            ModelProvider::OpenAi => write!(f, "openai"),
        }
    }
}

/// How an OpenAI-compatible endpoint is asked for structured output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseMode {
    /// `response_format: json_schema`, the schema travels with the request
    #[default]
    JsonSchema,
    /// `response_format: json_object`, for models without schema support;
    /// the schema is spelled out in the system prompt instead
    JsonObject,
}

/// Chat message shared by both providers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Ollama `/api/chat` request
#[derive(Debug, Clone, Serialize)]
pub struct OllamaChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
    /// JSON schema for constrained decoding
    pub format: Value,
    pub options: OllamaOptions,
}

/// Ollama sampling options
#[derive(Debug, Clone, Serialize)]
pub struct OllamaOptions {
    pub temperature: f32,
    pub num_predict: u32,
}

/// Ollama `/api/chat` non-streaming response
#[derive(Debug, Deserialize)]
pub struct OllamaChatResponse {
    pub message: ChatMessage,
}

/// OpenAI-compatible `/chat/completions` request
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub response_format: ResponseFormat,
}

/// `response_format` block requesting JSON output
#[derive(Debug, Clone, Serialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_schema: Option<JsonSchemaFormat>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JsonSchemaFormat {
    pub name: String,
    pub strict: bool,
    pub schema: Value,
}

impl ResponseFormat {
    pub fn json_schema(name: &str, schema: Value, strict: bool) -> Self {
        Self {
            kind: "json_schema".to_string(),
            json_schema: Some(JsonSchemaFormat {
                name: name.to_string(),
                strict,
                schema,
            }),
        }
    }

    pub fn json_object() -> Self {
        Self {
            kind: "json_object".to_string(),
            json_schema: None,
        }
    }
}

/// OpenAI-compatible `/chat/completions` response
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoiceMessage {
    /// Absent when the provider refuses or returns tool calls
    #[serde(default)]
    pub content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_provider_serialization() {
        assert_eq!(serde_json::to_value(ModelProvider::OpenAi).unwrap(), json!("openai"));
        let provider: ModelProvider = serde_json::from_value(json!("ollama")).unwrap();
        assert_eq!(provider, ModelProvider::Ollama);
        assert_eq!(ModelProvider::OpenAi.to_string(), "openai");
    }

    #[test]
    fn test_response_format_shape() {
        let format = ResponseFormat::json_schema("assessment", json!({"type": "object"}), true);
        let value = serde_json::to_value(format).unwrap();
        assert_eq!(value["type"], json!("json_schema"));
        assert_eq!(value["json_schema"]["name"], json!("assessment"));
        assert_eq!(value["json_schema"]["strict"], json!(true));

        let value = serde_json::to_value(ResponseFormat::json_object()).unwrap();
        assert_eq!(value, json!({"type": "json_object"}));
    }

    #[test]
    fn test_response_mode_names() {
        assert_eq!(serde_json::to_value(ResponseMode::JsonObject).unwrap(), json!("json_object"));
        assert_eq!(ResponseMode::default(), ResponseMode::JsonSchema);
    }

    #[test]
    fn test_completion_response_without_content() {
        let response: ChatCompletionResponse =
            serde_json::from_value(json!({"choices": [{"message": {"role": "assistant"}}]}))
                .unwrap();
        assert!(response.choices[0].message.content.is_none());
    }
}
