// End-to-end RCA pipeline: retrieve -> format -> synthesize
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn, Instrument};
use uuid::Uuid;

use crate::errors::Result;
use crate::models::GenerativeModel;
use crate::rag::context::ContextFormatter;
use crate::rag::retrieval::VectorStore;
use crate::rag::state::{PipelineStage, StageEvent};
use crate::rag::synthesis::AssessmentSynthesizer;
use crate::types::{Assessment, RetrievalResult};

/// Orchestrator over trait objects, as built from configuration
pub type DynOrchestrator = RcaOrchestrator<Arc<dyn VectorStore>, Arc<dyn GenerativeModel>>;

/// Assessment together with the log evidence it was derived from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Investigation {
    pub assessment: Assessment,
    pub evidence: RetrievalResult,
}

/// Root-cause analysis pipeline
///
/// Holds only reusable client handles; nothing is remembered between calls,
/// so one instance can serve concurrent requests.
pub struct RcaOrchestrator<V, M> {
    store: V,
    formatter: ContextFormatter,
    synthesizer: AssessmentSynthesizer<M>,
}

impl<V: VectorStore, M: GenerativeModel> RcaOrchestrator<V, M> {
    pub fn new(store: V, model: M) -> Self {
        Self::with_formatter(store, model, ContextFormatter::new())
    }

    pub fn with_formatter(store: V, model: M, formatter: ContextFormatter) -> Self {
        Self {
            store,
            formatter,
            synthesizer: AssessmentSynthesizer::new(model),
        }
    }

    pub fn store(&self) -> &V {
        &self.store
    }

    pub fn model(&self) -> &M {
        self.synthesizer.model()
    }

    pub fn formatter(&self) -> &ContextFormatter {
        &self.formatter
    }

    /// Analyze one incident description
    ///
    /// Stage errors are returned exactly as the stage raised them.
    pub async fn analyze(&self, issue: &str) -> Result<Assessment> {
        self.investigate(issue)
            .await
            .map(|investigation| investigation.assessment)
    }

    /// Analyze and keep the retrieved matches alongside the assessment
    pub async fn investigate(&self, issue: &str) -> Result<Investigation> {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!("analyze", %request_id);
        self.run(issue).instrument(span).await
    }

    async fn run(&self, issue: &str) -> Result<Investigation> {
        let mut stage = PipelineStage::Idle;
        advance(&mut stage, StageEvent::Start);

        let evidence = match self.store.query(issue).await {
            Ok(result) => result,
            Err(err) => {
                warn!(error = %err, "retrieval failed");
                advance(&mut stage, StageEvent::StageFailed);
                return Err(err.into());
            }
        };
        debug!(matches = evidence.len(), "retrieved log matches");
        advance(&mut stage, StageEvent::MatchesRetrieved);

        let context = self.formatter.format(&evidence);
        advance(&mut stage, StageEvent::ContextReady);

        let assessment = match self.synthesizer.synthesize(issue, &context).await {
            Ok(assessment) => assessment,
            Err(err) => {
                warn!(error = %err, "synthesis failed");
                advance(&mut stage, StageEvent::StageFailed);
                return Err(err.into());
            }
        };
        advance(&mut stage, StageEvent::AssessmentValid);

        info!(
            severity = %assessment.severity,
            service = %assessment.service,
            evidence = evidence.len(),
            "assessment ready"
        );

        Ok(Investigation {
            assessment,
            evidence,
        })
    }
}

fn advance(stage: &mut PipelineStage, event: StageEvent) {
    match stage.transition(event) {
        Ok(next) => {
            debug!(from = %stage, to = %next, "stage transition");
            *stage = next;
        }
        Err(err) => debug_assert!(false, "{}", err),
    }
}
