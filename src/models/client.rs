//! Generative model seam
//!
//! A model receives one prompt plus a target JSON schema and hands back a
//! JSON object. Validation against the schema is the caller's job; clients
//! only guarantee that what they return parsed as JSON.

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::SynthesisError;

/// One schema-constrained generation request
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredRequest {
    /// System instructions
    pub system: String,
    /// User turn
    pub user: String,
    /// JSON schema the output must follow
    pub schema: Value,
    /// Sampling temperature
    pub temperature: f32,
    /// Output token cap
    pub max_tokens: u32,
}

/// Schema-constrained text generation
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Perform exactly one model call
    async fn generate(&self, request: &StructuredRequest) -> Result<Value, SynthesisError>;

    /// Model identifier, for logs
    fn name(&self) -> &str;
}

#[async_trait]
impl<T: GenerativeModel + ?Sized> GenerativeModel for std::sync::Arc<T> {
    async fn generate(&self, request: &StructuredRequest) -> Result<Value, SynthesisError> {
        (**self).generate(request).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Parse the text of a model reply as a JSON value
///
/// Models occasionally wrap structured output in a markdown fence; the
/// fence is stripped, nothing else is repaired.
pub(crate) fn parse_structured_reply(content: &str) -> Result<Value, SynthesisError> {
    let trimmed = strip_code_fence(content.trim());
    if trimmed.is_empty() {
        return Err(SynthesisError::NonConformant("empty model reply".to_string()));
    }

    serde_json::from_str(trimmed).map_err(|e| SynthesisError::NonConformant(e.to_string()))
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
