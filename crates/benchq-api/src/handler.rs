use async_trait::async_trait;
use benchq_core::service::ScheduleReceipt;
use benchq_model::{CommitId, RepoId, Run, RunId};

use crate::error::ApiError;

/// Benchmark API backend.
///
/// Request bodies are passed as raw bytes because signatures cover the exact
/// bytes received.
#[async_trait]
pub trait ApiHandler: Send + Sync + 'static {
    /// Authenticate, parse and schedule a benchmark request.
    async fn schedule_benchmarks(
        &self,
        body: &[u8],
        signature: Option<&str>,
    ) -> Result<ScheduleReceipt, ApiError>;

    async fn get_run(&self, id: &RunId) -> Result<Run, ApiError>;

    /// Apply a signed status report from the build system.
    async fn update_run_status(
        &self,
        id: &RunId,
        body: &[u8],
        signature: Option<&str>,
    ) -> Result<Run, ApiError>;

    async fn list_commit_runs(&self, repo: &RepoId, commit: &CommitId) -> Result<Vec<Run>, ApiError>;
}
