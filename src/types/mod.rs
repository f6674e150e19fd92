//! Type definitions module
//!
//! Request-scoped data model shared by every pipeline stage.

pub mod assessment;
pub mod matches;

// Re-export commonly used types
pub use assessment::{Assessment, Severity};
pub use matches::{Match, RetrievalResult, MAX_MATCHES};
