// Assessment synthesizer: one schema-constrained model call per incident
use tracing::{debug, warn};

use crate::errors::SynthesisError;
use crate::models::{GenerativeModel, StructuredRequest};
use crate::rag::context::NO_RELEVANT_LOGS;
use crate::types::Assessment;

/// Fixed sampling temperature
pub const SYNTHESIS_TEMPERATURE: f32 = 0.3;

/// Output token cap
pub const SYNTHESIS_MAX_TOKENS: u32 = 1024;

/// System instructions for the triage model
pub const SYSTEM_PROMPT: &str = "You are an expert SRE acting as an incident-triage assistant. \
Use ONLY the provided log context and the described symptoms; do not assume facts that are not in them. \
Be precise and pragmatic: name the most likely root cause, the affected service, a severity of \
high, medium or low, and concrete fixes.";

const NO_EVIDENCE_DIRECTIVE: &str = "No log evidence was retrieved for this incident. \
State explicitly in `cause` that no supporting logs were found, base the assessment on the \
symptoms alone, and do not invent log lines, services or error codes.";

/// Build the user turn for one incident
pub fn build_user_prompt(issue: &str, context: &str) -> String {
    let mut prompt = format!(
        "Symptoms:\n{}\n\nRelevant logs (top-k):\n{}\n\n",
        issue.trim(),
        context
    );

    if context == NO_RELEVANT_LOGS {
        prompt.push_str(NO_EVIDENCE_DIRECTIVE);
        prompt.push_str("\n\n");
    }

    prompt.push_str(
        "Provide a structured root-cause assessment with the fields cause, service, severity and possible_fixes.",
    );
    prompt
}

/// Turns an incident description plus log context into a validated assessment
///
/// Exactly one model call per invocation. Output that fails the schema is
/// an error; it is never patched up.
pub struct AssessmentSynthesizer<M> {
    model: M,
}

impl<M: GenerativeModel> AssessmentSynthesizer<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Assemble the single request sent to the model
    pub fn build_request(&self, issue: &str, context: &str) -> StructuredRequest {
        StructuredRequest {
            system: SYSTEM_PROMPT.to_string(),
            user: build_user_prompt(issue, context),
            schema: Assessment::json_schema(),
            temperature: SYNTHESIS_TEMPERATURE,
            max_tokens: SYNTHESIS_MAX_TOKENS,
        }
    }

    pub async fn synthesize(&self, issue: &str, context: &str) -> Result<Assessment, SynthesisError> {
        let request = self.build_request(issue, context);
        debug!(model = self.model.name(), "requesting assessment");

        let raw = self.model.generate(&request).await?;

        Assessment::from_value(raw).map_err(|err| {
            warn!(model = self.model.name(), error = %err, "model output rejected");
            err
        })
    }
}
