//! Seams to the external collaborators: the source-control host and the build system.
//!
//! Concrete implementations live outside the core (see `benchq-integrations`);
//! tests plug in in-memory fakes.
use std::{future::Future, time::Duration};

use async_trait::async_trait;
use benchq_model::{Benchmarkable, BuildRef, CommitId, PullNumber, PullRequest, RepoId, Run};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{what} timed out after {}ms", .after.as_millis())]
    Timeout { what: &'static str, after: Duration },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("remote rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected response: {0}")]
    Decode(String),
}

/// Source-control host operations needed by the scheduler.
#[async_trait]
pub trait RepositoryClient: Send + Sync + 'static {
    /// Fetch pull request metadata.
    async fn get_pull(&self, repo: &RepoId, number: PullNumber) -> Result<PullRequest, ClientError>;

    /// Best common ancestor of `base_branch` and `head`.
    ///
    /// Returns [`ClientError::NotFound`] when the branch history is unavailable.
    async fn merge_base(
        &self,
        repo: &RepoId,
        base_branch: &str,
        head: &CommitId,
    ) -> Result<CommitId, ClientError>;

    /// Post a comment on the pull request conversation.
    async fn create_pull_comment(
        &self,
        repo: &RepoId,
        number: PullNumber,
        body: &str,
    ) -> Result<(), ClientError>;
}

/// Build system hand-off.
#[async_trait]
pub trait BuildTrigger: Send + Sync + 'static {
    /// Start a build for `run` against `target`. The scheduler calls this again
    /// for a run only after an earlier call returned an error.
    async fn trigger(&self, run: &Run, target: &Benchmarkable) -> Result<BuildRef, ClientError>;
}

/// Await `fut` for at most `after`. Timeouts are reported, never retried.
pub(crate) async fn bounded<T, F>(what: &'static str, after: Duration, fut: F) -> Result<T, ClientError>
where
    F: Future<Output = Result<T, ClientError>>,
{
    match tokio::time::timeout(after, fut).await {
        Ok(res) => res,
        Err(_) => Err(ClientError::Timeout { what, after }),
    }
}
