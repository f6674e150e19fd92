// Retrieval-augmented root-cause analysis
//
// Components:
// - Retrieval: two-stage similarity query (nearest neighbour + rerank)
// - Context: ranked matches -> bounded, prompt-ready text
// - Synthesis: one schema-constrained model call -> Assessment
// - Pipeline: strict retrieve -> format -> synthesize orchestration

pub mod retrieval;
pub mod context;
pub mod synthesis;
pub mod state;
pub mod pipeline;

// Re-export key types
pub use retrieval::{PineconeClient, QueryParams, RerankSpec, VectorStore};
pub use context::{ContextConfig, ContextFormatter, FieldAlternatives, NO_RELEVANT_LOGS};
pub use synthesis::AssessmentSynthesizer;
pub use state::PipelineStage;
pub use pipeline::{DynOrchestrator, Investigation, RcaOrchestrator};
