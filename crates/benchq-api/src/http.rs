use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
};
use benchq_core::signature::{SIGNATURE_256_HEADER, SIGNATURE_SHA1_HEADER};
use benchq_model::{CommitId, RepoId, Run, RunId};
use serde::Serialize;

use crate::{error::ApiError, handler::ApiHandler};

/// HTTP API service builder.
pub struct HttpApi<H> {
    handler: Arc<H>,
}

impl<H> HttpApi<H>
where
    H: ApiHandler,
{
    pub fn new(handler: Arc<H>) -> Self {
        Self { handler }
    }

    /// Build axum router with mounted endpoints.
    ///
    /// Routes:
    /// - POST /api/v1/benchmarks - Schedule benchmark runs for a pull request
    /// - GET  /api/v1/runs/{id} - Get one run
    /// - POST /api/v1/runs/{id}/status - Build system status report
    /// - GET  /api/v1/repos/{owner}/{name}/commits/{commit}/runs - Runs of a commit
    /// - GET  /healthz - Liveness
    pub fn router(self) -> Router {
        Router::new()
            .route("/api/v1/benchmarks", post(schedule_benchmarks::<H>))
            .route("/api/v1/runs/{id}", get(get_run::<H>))
            .route("/api/v1/runs/{id}/status", post(update_run_status::<H>))
            .route(
                "/api/v1/repos/{owner}/{name}/commits/{commit}/runs",
                get(list_commit_runs::<H>),
            )
            .route("/healthz", get(healthz))
            .with_state(self.handler)
    }
}

/// Signature header value, preferring SHA-256 over the legacy SHA-1 header.
pub fn signature_header(headers: &HeaderMap) -> Option<&str> {
    [SIGNATURE_256_HEADER, SIGNATURE_SHA1_HEADER]
        .into_iter()
        .find_map(|name| headers.get(name).and_then(|v| v.to_str().ok()))
}

// ============================================================================
// Response types
// ============================================================================

#[derive(Debug, Serialize)]
struct RunsResponse {
    runs: Vec<Run>,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/benchmarks
async fn schedule_benchmarks<H>(
    State(handler): State<Arc<H>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError>
where
    H: ApiHandler,
{
    let receipt = handler
        .schedule_benchmarks(&body, signature_header(&headers))
        .await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

/// GET /api/v1/runs/{id}
async fn get_run<H>(
    State(handler): State<Arc<H>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
    H: ApiHandler,
{
    let run = handler.get_run(&parse_run_id(&id)?).await?;
    Ok(Json(run))
}

/// POST /api/v1/runs/{id}/status
async fn update_run_status<H>(
    State(handler): State<Arc<H>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError>
where
    H: ApiHandler,
{
    let run = handler
        .update_run_status(&parse_run_id(&id)?, &body, signature_header(&headers))
        .await?;
    Ok(Json(run))
}

/// GET /api/v1/repos/{owner}/{name}/commits/{commit}/runs
async fn list_commit_runs<H>(
    State(handler): State<Arc<H>>,
    Path((owner, name, commit)): Path<(String, String, String)>,
) -> Result<impl IntoResponse, ApiError>
where
    H: ApiHandler,
{
    let repo = RepoId::new(format!("{owner}/{name}"))
        .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
    let commit = CommitId::new(commit).map_err(|e| ApiError::InvalidRequest(e.to_string()))?;

    let runs = handler.list_commit_runs(&repo, &commit).await?;
    Ok(Json(RunsResponse { runs }))
}

/// GET /healthz
async fn healthz() -> &'static str {
    "ok"
}

fn parse_run_id(s: &str) -> Result<RunId, ApiError> {
    s.parse()
        .map_err(|_| ApiError::InvalidRequest(format!("invalid run id: '{s}'")))
}
