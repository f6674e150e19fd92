//! Property tests for context formatting and the empty-evidence path

use async_trait::async_trait;
use quickcheck::{Arbitrary, Gen};
use quickcheck_macros::quickcheck;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};

use logsleuth::models::{GenerativeModel, StructuredRequest};
use logsleuth::rag::{ContextFormatter, RcaOrchestrator, VectorStore, NO_RELEVANT_LOGS};
use logsleuth::{Match, RetrievalError, RetrievalResult, SynthesisError};

const METADATA_KEYS: [&str; 9] = [
    "text", "message", "timestamp", "ts", "service", "svc", "level", "severity", "host",
];

/// Up to ten matches, sorted descending by score, with messy metadata
#[derive(Debug, Clone)]
struct RankedMatches(Vec<Match>);

impl Arbitrary for RankedMatches {
    fn arbitrary(g: &mut Gen) -> Self {
        let count = usize::arbitrary(g) % 11;
        let mut matches: Vec<Match> = (0..count)
            .map(|i| {
                let score = (u16::arbitrary(g) as f32) / (u16::MAX as f32);
                let mut entry = Match::new(format!("log-{}-{}", i, u16::arbitrary(g)), score);
                for _ in 0..(usize::arbitrary(g) % 5) {
                    let key = g.choose(&METADATA_KEYS).copied().unwrap_or("text");
                    let value = match u8::arbitrary(g) % 3 {
                        0 => String::arbitrary(g),
                        1 => "line one\n\tline  two\r\n".to_string(),
                        _ => String::new(),
                    };
                    entry.metadata.insert(key.to_string(), value);
                }
                entry
            })
            .collect();

        matches.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap());
        RankedMatches(matches)
    }
}

#[quickcheck]
fn sentinel_iff_empty(input: RankedMatches) -> bool {
    let formatter = ContextFormatter::new();
    let text = formatter.format(&RetrievalResult::new(input.0.clone()));

    (text == NO_RELEVANT_LOGS) == input.0.is_empty()
}

#[quickcheck]
fn one_block_per_match_in_input_order(input: RankedMatches) -> bool {
    if input.0.is_empty() {
        return true;
    }

    let formatter = ContextFormatter::new();
    let text = formatter.format(&RetrievalResult::new(input.0.clone()));
    let lines: Vec<&str> = text.split('\n').collect();

    lines.len() == input.0.len() * 2
        && input.0.iter().enumerate().all(|(idx, entry)| {
            let header = lines[idx * 2];
            let message = lines[idx * 2 + 1];
            header.starts_with(&format!("[{}] id={} score=", idx + 1, entry.id))
                && message.starts_with("    ")
        })
}

#[quickcheck]
fn formatting_is_deterministic(input: RankedMatches) -> bool {
    let result = RetrievalResult::new(input.0);
    let first = ContextFormatter::new().format(&result);
    let second = ContextFormatter::new().format(&result);
    first == second
}

struct EmptyStore;

#[async_trait]
impl VectorStore for EmptyStore {
    async fn query(&self, _text: &str) -> Result<RetrievalResult, RetrievalError> {
        Ok(RetrievalResult::empty())
    }
}

#[derive(Default)]
struct CountingModel {
    calls: AtomicUsize,
}

#[async_trait]
impl GenerativeModel for CountingModel {
    async fn generate(&self, request: &StructuredRequest) -> Result<Value, SynthesisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert!(request.user.contains(NO_RELEVANT_LOGS));
        Ok(json!({
            "cause": "No supporting logs were found",
            "service": "unknown",
            "severity": "low",
            "possible_fixes": "Widen the search window"
        }))
    }

    fn name(&self) -> &str {
        "counting"
    }
}

#[quickcheck]
fn empty_evidence_always_gets_exactly_one_model_call(issue: String) -> bool {
    let orchestrator = RcaOrchestrator::new(EmptyStore, CountingModel::default());
    let outcome = tokio_test::block_on(orchestrator.analyze(&issue));

    outcome.is_ok() && orchestrator_model_calls(&orchestrator) == 1
}

fn orchestrator_model_calls(orchestrator: &RcaOrchestrator<EmptyStore, CountingModel>) -> usize {
    orchestrator.model().calls.load(Ordering::SeqCst)
}
