//! Baseline commit resolution.
use std::{sync::Arc, time::Duration};

use benchq_model::{CommitId, PullRequest, RepoId};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::clients::{ClientError, RepositoryClient, bounded};

#[derive(Debug, Error)]
pub enum BaselineError {
    #[error("history of branch '{branch}' is unavailable: {reason}")]
    HistoryUnavailable { branch: String, reason: String },

    #[error("baseline lookup failed: {0}")]
    Client(#[from] ClientError),
}

/// Picks the commit a pull request is compared against: the merge base of the
/// target branch and the pull request head, i.e. the last target-branch commit
/// before the branches diverged.
pub struct BaselineResolver {
    repos: Arc<dyn RepositoryClient>,
    timeout: Duration,
}

impl BaselineResolver {
    pub fn new(repos: Arc<dyn RepositoryClient>, timeout: Duration) -> Self {
        Self { repos, timeout }
    }

    #[instrument(level = "debug", skip(self, pull), fields(pull = %pull.number, base = %pull.base_branch))]
    pub async fn resolve(&self, repo: &RepoId, pull: &PullRequest) -> Result<CommitId, BaselineError> {
        // Head already is the target tip: it is its own merge base.
        if pull.head_commit == pull.base_commit {
            debug!(baseline = %pull.head_commit, "head is the target branch tip");
            return Ok(pull.head_commit.clone());
        }

        let merge_base = bounded(
            "merge base lookup",
            self.timeout,
            self.repos.merge_base(repo, &pull.base_branch, &pull.head_commit),
        )
        .await
        .map_err(|e| match e {
            ClientError::NotFound(reason) => BaselineError::HistoryUnavailable {
                branch: pull.base_branch.clone(),
                reason,
            },
            other => BaselineError::Client(other),
        })?;

        debug!(baseline = %merge_base, "baseline resolved");
        Ok(merge_base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::{FakeRepos, commit, pull};

    #[tokio::test]
    async fn resolves_merge_base() {
        let repos = Arc::new(FakeRepos::default());
        repos.set_pull(pull(123, 'a', 'c'));
        repos.set_merge_base(&commit('a'), commit('b'));

        let resolver = BaselineResolver::new(repos, Duration::from_secs(1));
        let baseline = resolver
            .resolve(&"apache/arrow".parse().unwrap(), &pull(123, 'a', 'c'))
            .await
            .unwrap();
        assert_eq!(baseline, commit('b'));
    }

    #[tokio::test]
    async fn head_at_target_tip_needs_no_lookup() {
        let repos = Arc::new(FakeRepos::default());
        let resolver = BaselineResolver::new(repos.clone(), Duration::from_secs(1));

        let baseline = resolver
            .resolve(&"apache/arrow".parse().unwrap(), &pull(123, 'a', 'a'))
            .await
            .unwrap();

        assert_eq!(baseline, commit('a'));
        assert_eq!(repos.calls(), 0);
    }

    #[tokio::test]
    async fn missing_history_is_reported() {
        let repos = Arc::new(FakeRepos::default());
        let resolver = BaselineResolver::new(repos, Duration::from_secs(1));

        let err = resolver
            .resolve(&"apache/arrow".parse().unwrap(), &pull(123, 'a', 'c'))
            .await
            .unwrap_err();
        match err {
            BaselineError::HistoryUnavailable { branch, .. } => assert_eq!(branch, "main"),
            other => panic!("expected HistoryUnavailable, got {other:?}"),
        }
    }
}
