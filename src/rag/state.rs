//! Pipeline stage machine for one `analyze` call
//!
//! Linear, no loop-back:
//! - Idle → Retrieving → Formatting → Synthesizing → Done
//! - Retrieving | Synthesizing → Failed on error
//!
//! The machine lives on the stack of a single call and is discarded with it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stages of one analysis
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PipelineStage {
    #[default]
    Idle,
    Retrieving,
    Formatting,
    Synthesizing,
    /// Assessment produced (terminal)
    Done,
    /// A stage failed (terminal)
    Failed,
}

/// Events that advance the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageEvent {
    Start,
    MatchesRetrieved,
    ContextReady,
    AssessmentValid,
    StageFailed,
}

/// Rejected transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidTransition {
    pub from: PipelineStage,
    pub event: StageEvent,
}

impl fmt::Display for InvalidTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no transition from {} on {:?}", self.from, self.event)
    }
}

impl std::error::Error for InvalidTransition {}

impl PipelineStage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineStage::Done | PipelineStage::Failed)
    }

    /// Transition function
    ///
    /// Valid edges:
    /// 1. Idle         → Retrieving   (on: Start)
    /// 2. Retrieving   → Formatting   (on: MatchesRetrieved)
    /// 3. Retrieving   → Failed       (on: StageFailed)
    /// 4. Formatting   → Synthesizing (on: ContextReady)
    /// 5. Synthesizing → Done         (on: AssessmentValid)
    /// 6. Synthesizing → Failed       (on: StageFailed)
    ///
    /// Formatting cannot fail, so it has no failure edge.
    pub fn transition(&self, event: StageEvent) -> Result<PipelineStage, InvalidTransition> {
        use PipelineStage::*;
        use StageEvent::*;

        match (self, event) {
            (Idle, Start) => Ok(Retrieving),
            (Retrieving, MatchesRetrieved) => Ok(Formatting),
            (Retrieving, StageFailed) => Ok(Failed),
            (Formatting, ContextReady) => Ok(Synthesizing),
            (Synthesizing, AssessmentValid) => Ok(Done),
            (Synthesizing, StageFailed) => Ok(Failed),
            (from, event) => Err(InvalidTransition { from: *from, event }),
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Idle => "idle",
            PipelineStage::Retrieving => "retrieving",
            PipelineStage::Formatting => "formatting",
            PipelineStage::Synthesizing => "synthesizing",
            PipelineStage::Done => "done",
            PipelineStage::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_idle() {
        assert_eq!(PipelineStage::default(), PipelineStage::Idle);
        assert!(!PipelineStage::default().is_terminal());
    }

    #[test]
    fn test_happy_path() {
        let mut stage = PipelineStage::default();
        for event in [
            StageEvent::Start,
            StageEvent::MatchesRetrieved,
            StageEvent::ContextReady,
            StageEvent::AssessmentValid,
        ] {
            stage = stage.transition(event).unwrap();
        }
        assert_eq!(stage, PipelineStage::Done);
        assert!(stage.is_terminal());
    }

    #[test]
    fn test_failure_edges() {
        let failed = PipelineStage::Retrieving.transition(StageEvent::StageFailed).unwrap();
        assert_eq!(failed, PipelineStage::Failed);

        let failed = PipelineStage::Synthesizing.transition(StageEvent::StageFailed).unwrap();
        assert_eq!(failed, PipelineStage::Failed);
    }

    #[test]
    fn test_no_skipping_or_loop_back() {
        assert!(PipelineStage::Idle.transition(StageEvent::ContextReady).is_err());
        assert!(PipelineStage::Formatting.transition(StageEvent::StageFailed).is_err());
        assert!(PipelineStage::Done.transition(StageEvent::Start).is_err());
        assert!(PipelineStage::Failed.transition(StageEvent::Start).is_err());
    }

    #[test]
    fn test_invalid_transition_display() {
        let err = PipelineStage::Done.transition(StageEvent::Start).unwrap_err();
        assert!(err.to_string().contains("done"));
    }
}
