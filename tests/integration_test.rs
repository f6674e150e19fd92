//! Integration tests for the analysis pipeline
//!
//! Runs the full retrieve -> format -> synthesize flow against in-process
//! vector store and model doubles; no index or model server is needed.

use async_trait::async_trait;
use futures_util::future::join_all;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use logsleuth::models::{GenerativeModel, StructuredRequest};
use logsleuth::rag::{RcaOrchestrator, VectorStore, NO_RELEVANT_LOGS};
use logsleuth::{
    Match, RcaError, RetrievalError, RetrievalResult, Severity, SynthesisError,
};

/// Vector store double with a canned outcome and optional latency
struct MockStore {
    outcome: Result<RetrievalResult, RetrievalError>,
    delay: Duration,
    queries: Mutex<Vec<String>>,
}

impl MockStore {
    fn returning(matches: Vec<Match>) -> Self {
        Self {
            outcome: Ok(RetrievalResult::new(matches)),
            delay: Duration::ZERO,
            queries: Mutex::new(Vec::new()),
        }
    }

    fn failing(err: RetrievalError) -> Self {
        Self {
            outcome: Err(err),
            delay: Duration::ZERO,
            queries: Mutex::new(Vec::new()),
        }
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl VectorStore for MockStore {
    async fn query(&self, text: &str) -> Result<RetrievalResult, RetrievalError> {
        self.queries.lock().unwrap().push(text.to_string());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.outcome.clone()
    }
}

/// Model double returning a canned object and recording prompts
struct MockModel {
    reply: Result<Value, SynthesisError>,
    delay: Duration,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl MockModel {
    fn replying(reply: Value) -> Self {
        Self {
            reply: Ok(reply),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn failing(err: SynthesisError) -> Self {
        Self {
            reply: Err(err),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerativeModel for MockModel {
    async fn generate(&self, request: &StructuredRequest) -> Result<Value, SynthesisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(request.user.clone());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.reply.clone()
    }

    fn name(&self) -> &str {
        "mock"
    }
}

fn three_matches() -> Vec<Match> {
    vec![
        Match::new("log-a", 0.93)
            .with_field("message", "HTTP 500 POST /orders upstream timeout")
            .with_field("svc", "service-x")
            .with_field("severity", "error"),
        Match::new("log-b", 0.81)
            .with_field("text", "db pool exhausted (max=20)")
            .with_field("service", "service-x")
            .with_field("level", "warn"),
        Match::new("log-c", 0.64)
            .with_field("text", "retrying request 3/3")
            .with_field("ts", "2024-06-01T12:00:03Z"),
    ]
}

fn assessment_json(cause: &str, service: &str, severity: &str) -> Value {
    json!({
        "cause": cause,
        "service": service,
        "severity": severity,
        "possible_fixes": format!("Investigate {}", service)
    })
}

#[tokio::test]
async fn test_analyze_returns_complete_assessment() {
    let store = Arc::new(MockStore::returning(three_matches()));
    let model = Arc::new(MockModel::replying(assessment_json(
        "Database connection pool exhausted",
        "service-x",
        "high",
    )));
    let orchestrator = RcaOrchestrator::new(store.clone(), model.clone());

    let assessment = orchestrator
        .analyze("service X is returning 500s")
        .await
        .unwrap();

    assert!(Severity::ALL.contains(&assessment.severity));
    assert!(!assessment.cause.is_empty());
    assert!(!assessment.service.is_empty());
    assert!(!assessment.possible_fixes.is_empty());

    assert_eq!(model.calls(), 1);
    assert_eq!(
        *store.queries.lock().unwrap(),
        vec!["service X is returning 500s".to_string()]
    );

    let prompt = model.prompts.lock().unwrap()[0].clone();
    assert!(prompt.contains("service X is returning 500s"));
    assert!(prompt.contains("[1] id=log-a score=0.930 service=service-x level=error"));
    assert!(prompt.contains("[3] id=log-c"));
}

#[tokio::test]
async fn test_out_of_enum_severity_fails_with_synthesis_error() {
    let orchestrator = RcaOrchestrator::new(
        MockStore::returning(three_matches()),
        MockModel::replying(assessment_json("Disk full", "node-a", "critical")),
    );

    let result = orchestrator.analyze("service X is returning 500s").await;

    match result {
        Err(RcaError::Synthesis(SynthesisError::SchemaViolation(message))) => {
            assert!(message.contains("critical"));
        }
        other => panic!("expected schema violation, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_field_fails_with_synthesis_error() {
    let orchestrator = RcaOrchestrator::new(
        MockStore::returning(three_matches()),
        MockModel::replying(json!({ "cause": "x", "service": "y", "severity": "low" })),
    );

    let err = orchestrator.analyze("anything").await.unwrap_err();
    assert_eq!(err.kind(), "synthesis_error");
}

#[tokio::test]
async fn test_retrieval_timeout_never_reaches_model() {
    let model = Arc::new(MockModel::replying(assessment_json("x", "y", "low")));
    let orchestrator = RcaOrchestrator::new(
        MockStore::failing(RetrievalError::Timeout { duration_ms: 30000 }),
        model.clone(),
    );

    let err = orchestrator.analyze("service X is returning 500s").await.unwrap_err();

    assert_eq!(
        err,
        RcaError::Retrieval(RetrievalError::Timeout { duration_ms: 30000 })
    );
    assert_eq!(model.calls(), 0);
}

#[tokio::test]
async fn test_model_failure_propagates_unchanged() {
    let orchestrator = RcaOrchestrator::new(
        MockStore::returning(three_matches()),
        MockModel::failing(SynthesisError::Api {
            status: 429,
            message: "rate limited".to_string(),
        }),
    );

    let err = orchestrator.analyze("anything").await.unwrap_err();
    assert_eq!(
        err,
        RcaError::Synthesis(SynthesisError::Api {
            status: 429,
            message: "rate limited".to_string(),
        })
    );
}

#[tokio::test]
async fn test_zero_matches_still_synthesizes_with_sentinel() {
    let model = Arc::new(MockModel::replying(assessment_json(
        "No supporting logs were found; symptoms suggest a cold cache",
        "unknown",
        "low",
    )));
    let orchestrator = RcaOrchestrator::new(MockStore::returning(Vec::new()), model.clone());

    let investigation = orchestrator.investigate("cache misses spiking").await.unwrap();

    assert!(investigation.evidence.is_empty());
    assert_eq!(model.calls(), 1);
    let prompt = model.prompts.lock().unwrap()[0].clone();
    assert!(prompt.contains(NO_RELEVANT_LOGS));
}

#[tokio::test]
async fn test_concurrent_calls_do_not_cross_contaminate() {
    let disk = RcaOrchestrator::new(
        MockStore::returning(vec![Match::new("disk-1", 0.9).with_field("text", "no space left on device")])
            .with_delay(Duration::from_millis(30)),
        MockModel::replying(assessment_json("Disk full on node A", "node-a", "high"))
            .with_delay(Duration::from_millis(5)),
    );
    let latency = RcaOrchestrator::new(
        MockStore::returning(vec![Match::new("lat-1", 0.8).with_field("text", "p99 4.2s")])
            .with_delay(Duration::from_millis(5)),
        MockModel::replying(assessment_json("GC pauses on service B", "service-b", "medium"))
            .with_delay(Duration::from_millis(30)),
    );

    let (a, b) = tokio::join!(
        disk.analyze("disk full on node A"),
        latency.analyze("latency spike on service B"),
    );
    let a = a.unwrap();
    let b = b.unwrap();

    assert_eq!(a.service, "node-a");
    assert_eq!(a.severity, Severity::High);
    assert_eq!(a.cause, "Disk full on node A");

    assert_eq!(b.service, "service-b");
    assert_eq!(b.severity, Severity::Medium);
    assert_eq!(b.cause, "GC pauses on service B");
}

#[tokio::test]
async fn test_shared_orchestrator_serves_parallel_tasks() {
    let store = Arc::new(MockStore::returning(three_matches()).with_delay(Duration::from_millis(10)));
    let model = Arc::new(MockModel::replying(assessment_json("Pool exhausted", "service-x", "high")));
    let orchestrator = Arc::new(RcaOrchestrator::new(store.clone(), model.clone()));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let orchestrator = orchestrator.clone();
            tokio::spawn(async move { orchestrator.analyze(&format!("incident {}", i)).await })
        })
        .collect();

    for outcome in join_all(handles).await {
        assert_eq!(outcome.unwrap().unwrap().service, "service-x");
    }

    assert_eq!(model.calls(), 8);
    let mut queries = store.queries.lock().unwrap().clone();
    queries.sort();
    let mut expected: Vec<String> = (0..8).map(|i| format!("incident {}", i)).collect();
    expected.sort();
    assert_eq!(queries, expected);
}
