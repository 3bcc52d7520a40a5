use std::sync::Arc;

use async_trait::async_trait;
use benchq_core::service::{BenchmarkService, ScheduleReceipt};
use benchq_model::{CommitId, RepoId, Run, RunId};

use crate::{error::ApiError, handler::ApiHandler};

/// [`ApiHandler`] backed directly by a [`BenchmarkService`].
pub struct ServiceApiAdapter {
    service: Arc<BenchmarkService>,
}

impl ServiceApiAdapter {
    pub fn new(service: Arc<BenchmarkService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl ApiHandler for ServiceApiAdapter {
    async fn schedule_benchmarks(
        &self,
        body: &[u8],
        signature: Option<&str>,
    ) -> Result<ScheduleReceipt, ApiError> {
        Ok(self.service.handle_trigger(body, signature).await?)
    }

    async fn get_run(&self, id: &RunId) -> Result<Run, ApiError> {
        Ok(self.service.run(id)?)
    }

    async fn update_run_status(
        &self,
        id: &RunId,
        body: &[u8],
        signature: Option<&str>,
    ) -> Result<Run, ApiError> {
        Ok(self.service.handle_status_update(id, body, signature).await?)
    }

    async fn list_commit_runs(&self, repo: &RepoId, commit: &CommitId) -> Result<Vec<Run>, ApiError> {
        Ok(self.service.runs_for_commit(repo, commit)?)
    }
}
