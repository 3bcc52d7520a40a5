//! Outcome comments posted back to the pull request.
use std::{sync::Arc, time::Duration};

use benchq_model::{CommitId, PullNumber, RepoId};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::{
    clients::{ClientError, RepositoryClient, bounded},
    scheduler::ScheduleConflict,
};

/// Where requesters can follow their runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Links {
    /// Build system dashboard, e.g. `https://buildkite.com/<org>`.
    pub build_dashboard_url: String,
    /// Results browser.
    pub results_url: String,
}

/// Comment announcing freshly scheduled runs.
pub fn scheduled_message(head: &CommitId, baseline: &CommitId, links: &Links) -> String {
    format!(
        "Benchmark runs are scheduled for commit {head} (baseline {baseline}). Watch {} and {} \
         for updates. A comment will be posted here when the runs are complete.",
        links.build_dashboard_url, links.results_url,
    )
}

/// Posts exactly one comment per handled outcome.
pub struct Notifier {
    repos: Arc<dyn RepositoryClient>,
    links: Links,
    timeout: Duration,
}

impl Notifier {
    pub fn new(repos: Arc<dyn RepositoryClient>, links: Links, timeout: Duration) -> Self {
        Self {
            repos,
            links,
            timeout,
        }
    }

    pub fn links(&self) -> &Links {
        &self.links
    }

    pub async fn scheduled(
        &self,
        repo: &RepoId,
        pull: PullNumber,
        head: &CommitId,
        baseline: &CommitId,
    ) -> Result<(), ClientError> {
        self.post(repo, pull, &scheduled_message(head, baseline, &self.links))
            .await
    }

    pub async fn unsupported(&self, repo: &RepoId, pull: PullNumber, usage: &str) -> Result<(), ClientError> {
        self.post(repo, pull, usage).await
    }

    pub async fn conflict(
        &self,
        repo: &RepoId,
        pull: PullNumber,
        conflict: &ScheduleConflict,
    ) -> Result<(), ClientError> {
        self.post(repo, pull, &conflict.to_string()).await
    }

    #[instrument(level = "debug", skip(self, body), fields(len = body.len()))]
    async fn post(&self, repo: &RepoId, pull: PullNumber, body: &str) -> Result<(), ClientError> {
        bounded(
            "pull request comment",
            self.timeout,
            self.repos.create_pull_comment(repo, pull, body),
        )
        .await?;
        debug!("comment posted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::{FakeRepos, commit};
    use benchq_model::RunStatus;

    fn links() -> Links {
        Links {
            build_dashboard_url: "https://buildkite.com/apache-arrow".into(),
            results_url: "https://conbench.ursa.dev".into(),
        }
    }

    #[test]
    fn scheduled_message_names_both_commits_and_links() {
        let msg = scheduled_message(&commit('a'), &commit('b'), &links());
        assert!(msg.contains(commit('a').as_str()));
        assert!(msg.contains(commit('b').as_str()));
        assert!(msg.contains("https://buildkite.com/apache-arrow"));
        assert!(msg.contains("https://conbench.ursa.dev"));
    }

    #[tokio::test]
    async fn each_outcome_posts_one_comment() {
        let repos = Arc::new(FakeRepos::default());
        let n = Notifier::new(repos.clone(), links(), Duration::from_secs(1));
        let repo: RepoId = "apache/arrow".parse().unwrap();
        let pull = PullNumber::new(7).unwrap();

        n.scheduled(&repo, pull, &commit('a'), &commit('b')).await.unwrap();
        n.unsupported(&repo, pull, "usage").await.unwrap();
        n.conflict(
            &repo,
            pull,
            &ScheduleConflict::new(vec![(commit('a'), RunStatus::Queued)]),
        )
        .await
        .unwrap();

        let comments = repos.comments();
        assert_eq!(comments.len(), 3);
        assert_eq!(comments[1], "usage");
        assert!(comments[2].contains("queued"));
    }
}
