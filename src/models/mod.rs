//! Generative model clients
//!
//! This module provides the model seam used by the synthesizer:
//! - `GenerativeModel` trait for schema-constrained generation
//! - Ollama `/api/chat` client
//! - OpenAI-compatible `/chat/completions` client

pub mod client;
pub mod ollama;
pub mod openai;
pub mod types;

// Re-export key types for convenience
pub use client::{GenerativeModel, StructuredRequest};
pub use ollama::OllamaClient;
pub use openai::OpenAiClient;
pub use types::{ModelProvider, ResponseMode};
