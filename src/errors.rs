//! Error types for LogSleuth
//!
//! Only two error kinds ever leave the analysis pipeline: a retrieval
//! failure against the vector index, or a synthesis failure against the
//! generative model. Malformed match metadata is recovered locally by the
//! context formatter and never surfaces here.

use thiserror::Error;

/// Vector index failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RetrievalError {
    /// Request did not complete in time
    #[error("Vector index request timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// Could not reach the index
    #[error("Vector index connection failed: {0}")]
    Connection(String),

    /// Index (or its namespace) does not exist
    #[error("Vector index not found: {index}")]
    IndexNotFound { index: String },

    /// Index answered with a non-success status
    #[error("Vector index API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// Index answered with a body we could not decode
    #[error("Vector index returned an invalid response: {0}")]
    InvalidResponse(String),

    /// Client is missing required settings
    #[error("Vector index configuration error: {0}")]
    Config(String),
}

/// Generative model failures, including schema violations of its output
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SynthesisError {
    /// Request did not complete in time
    #[error("Model request timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// Could not reach the model endpoint
    #[error("Model connection failed: {0}")]
    Connection(String),

    /// Model endpoint answered with a non-success status
    #[error("Model API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// Model output was not a structured object at all
    #[error("Model output is not structured JSON: {0}")]
    NonConformant(String),

    /// Model output was JSON but does not satisfy the assessment schema
    #[error("Model output violates the assessment schema: {0}")]
    SchemaViolation(String),

    /// Client is missing required settings
    #[error("Model configuration error: {0}")]
    Config(String),
}

/// Error returned by [`crate::rag::RcaOrchestrator::analyze`]
///
/// Each variant is a transparent carrier: the stage error reaches the
/// caller exactly as the stage produced it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RcaError {
    #[error(transparent)]
    Retrieval(#[from] RetrievalError),

    #[error(transparent)]
    Synthesis(#[from] SynthesisError),
}

impl RcaError {
    /// Short machine-readable kind, used by the front ends
    pub fn kind(&self) -> &'static str {
        match self {
            RcaError::Retrieval(_) => "retrieval_error",
            RcaError::Synthesis(_) => "synthesis_error",
        }
    }

    /// Whether the underlying stage failed by timing out
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            RcaError::Retrieval(RetrievalError::Timeout { .. })
                | RcaError::Synthesis(SynthesisError::Timeout { .. })
        )
    }
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, RcaError>;

/// Classify a transport-level reqwest failure against the index
pub(crate) fn retrieval_transport_error(err: reqwest::Error, timeout_ms: u64) -> RetrievalError {
    if err.is_timeout() {
        RetrievalError::Timeout {
            duration_ms: timeout_ms,
        }
    } else if err.is_connect() {
        RetrievalError::Connection(err.to_string())
    } else if err.is_decode() {
        RetrievalError::InvalidResponse(err.to_string())
    } else {
        RetrievalError::Connection(err.to_string())
    }
}

/// Classify a transport-level reqwest failure against the model endpoint
pub(crate) fn synthesis_transport_error(err: reqwest::Error, timeout_ms: u64) -> SynthesisError {
    if err.is_timeout() {
        SynthesisError::Timeout {
            duration_ms: timeout_ms,
        }
    } else if err.is_decode() {
        SynthesisError::NonConformant(err.to_string())
    } else {
        SynthesisError::Connection(err.to_string())
    }
}
