//! LogSleuth - retrieval-augmented root-cause analysis over operational logs
//!
//! One incident description in, one validated assessment out:
//!
//! ```text
//! issue -> VectorStore::query -> ContextFormatter::format
//!       -> AssessmentSynthesizer::synthesize -> Assessment
//! ```
//!
//! The pipeline core lives in [`rag`]; [`models`] holds the generative model
//! clients, and [`cli`], [`repl`] and [`server`] are thin front ends over
//! [`rag::RcaOrchestrator::analyze`].

pub mod errors;
pub mod types;
pub mod models;
pub mod rag;

// Re-export commonly used types
pub use errors::{RcaError, Result, RetrievalError, SynthesisError};
pub use rag::RcaOrchestrator;
pub use types::{Assessment, Match, RetrievalResult, Severity};

// Front ends
pub mod cli;
pub mod config;
pub mod repl;
pub mod server;
