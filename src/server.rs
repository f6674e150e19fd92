//! HTTP front end for the analysis pipeline.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/analyze` | Assessment for `{"issue": "..."}` |
//! | `POST` | `/investigate` | Assessment plus the log matches behind it |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "retrieval_error", "message": "Vector index not found: logs" } }
//! ```
//!
//! Error codes: `bad_request` (400, also for unparseable bodies), `retrieval_error` (502, or 504 on timeout),
//! `synthesis_error` (502, or 504 on timeout).

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::errors::RcaError;
use crate::models::GenerativeModel;
use crate::rag::retrieval::VectorStore;
use crate::rag::{Investigation, RcaOrchestrator};
use crate::types::Assessment;

/// Builds the router over a shared orchestrator.
pub fn router<V, M>(orchestrator: Arc<RcaOrchestrator<V, M>>) -> Router
where
    V: VectorStore + 'static,
    M: GenerativeModel + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/analyze", post(handle_analyze::<V, M>))
        .route("/investigate", post(handle_investigate::<V, M>))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(orchestrator)
}

/// Binds to `bind_addr` and serves until the process is terminated.
pub async fn run_server<V, M>(bind_addr: &str, orchestrator: Arc<RcaOrchestrator<V, M>>) -> anyhow::Result<()>
where
    V: VectorStore + 'static,
    M: GenerativeModel + 'static,
{
    let listener = TcpListener::bind(bind_addr).await?;
    info!(addr = %listener.local_addr()?, "server listening");
    axum::serve(listener, router(orchestrator)).await?;
    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

/// Unparseable bodies and missing fields use the same envelope as every other error.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        bad_request(rejection.body_text())
    }
}

impl From<RcaError> for AppError {
    fn from(err: RcaError) -> Self {
        let status = if err.is_timeout() {
            StatusCode::GATEWAY_TIMEOUT
        } else {
            StatusCode::BAD_GATEWAY
        };
        AppError {
            status,
            code: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}

// ============ Handlers ============

/// Request body for `POST /analyze` and `POST /investigate`.
#[derive(Debug, Deserialize)]
struct AnalyzeRequest {
    issue: String,
}

impl AnalyzeRequest {
    fn issue(&self) -> Result<&str, AppError> {
        let issue = self.issue.trim();
        if issue.is_empty() {
            return Err(bad_request("issue must not be empty"));
        }
        Ok(issue)
    }
}

async fn handle_analyze<V, M>(
    State(orchestrator): State<Arc<RcaOrchestrator<V, M>>>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<Assessment>, AppError>
where
    V: VectorStore + 'static,
    M: GenerativeModel + 'static,
{
    let Json(request) = payload?;
    let assessment = orchestrator.analyze(request.issue()?).await?;
    Ok(Json(assessment))
}

async fn handle_investigate<V, M>(
    State(orchestrator): State<Arc<RcaOrchestrator<V, M>>>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<Investigation>, AppError>
where
    V: VectorStore + 'static,
    M: GenerativeModel + 'static,
{
    let Json(request) = payload?;
    let investigation = orchestrator.investigate(request.issue()?).await?;
    Ok(Json(investigation))
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
