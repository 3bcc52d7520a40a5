//! GitHub REST client: pull request lookup, merge base, PR comments.
mod wire;

use std::time::Duration;

use async_trait::async_trait;
use benchq_core::clients::{ClientError, RepositoryClient};
use benchq_model::{CommitId, PullNumber, PullRequest, RepoId};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::{
    error::IntegrationError,
    http::{self, join},
};

const SERVICE: &str = "github";
pub const DEFAULT_API_URL: &str = "https://api.github.com";

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Token used as `Authorization: Bearer`.
    #[serde(default)]
    pub token: Option<String>,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            token: None,
        }
    }
}

pub struct GithubClient {
    http: Client,
    api_url: String,
    token: Option<String>,
}

impl GithubClient {
    pub fn new(cfg: &GithubConfig, timeout: Duration) -> Result<Self, IntegrationError> {
        if cfg.api_url.trim().is_empty() {
            return Err(IntegrationError::InvalidConfig("github api_url is empty".into()));
        }
        Ok(Self {
            http: http::client(timeout)?,
            api_url: cfg.api_url.clone(),
            token: cfg.token.clone().filter(|t| !t.is_empty()),
        })
    }

    fn request(&self, builder: RequestBuilder) -> RequestBuilder {
        let builder = builder
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28");
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    pub(crate) fn pull_url(&self, repo: &RepoId, number: PullNumber) -> String {
        join(&self.api_url, &format!("repos/{repo}/pulls/{number}"))
    }

    pub(crate) fn compare_url(&self, repo: &RepoId, base: &str, head: &CommitId) -> String {
        join(&self.api_url, &format!("repos/{repo}/compare/{base}...{head}"))
    }

    pub(crate) fn comments_url(&self, repo: &RepoId, number: PullNumber) -> String {
        join(&self.api_url, &format!("repos/{repo}/issues/{number}/comments"))
    }

    async fn fetch_pull(&self, repo: &RepoId, number: PullNumber) -> Result<PullRequest, IntegrationError> {
        let resp = self.request(self.http.get(self.pull_url(repo, number))).send().await?;
        http::json::<wire::Pull>(SERVICE, resp).await?.into_model()
    }

    async fn fetch_merge_base(
        &self,
        repo: &RepoId,
        base: &str,
        head: &CommitId,
    ) -> Result<CommitId, IntegrationError> {
        let resp = self
            .request(self.http.get(self.compare_url(repo, base, head)))
            .send()
            .await?;
        http::json::<wire::Compare>(SERVICE, resp).await?.merge_base()
    }

    async fn post_comment(&self, repo: &RepoId, number: PullNumber, body: &str) -> Result<(), IntegrationError> {
        let resp = self
            .request(self.http.post(self.comments_url(repo, number)))
            .json(&wire::NewComment { body })
            .send()
            .await?;
        http::check(SERVICE, resp).await?;
        Ok(())
    }
}

#[async_trait]
impl RepositoryClient for GithubClient {
    #[instrument(level = "debug", skip_all, fields(repo = %repo, pull = %number))]
    async fn get_pull(&self, repo: &RepoId, number: PullNumber) -> Result<PullRequest, ClientError> {
        let pull = self.fetch_pull(repo, number).await?;
        debug!(head = %pull.head_commit.short(), base = %pull.base_branch, "pull request fetched");
        Ok(pull)
    }

    #[instrument(level = "debug", skip_all, fields(repo = %repo, head = %head.short()))]
    async fn merge_base(&self, repo: &RepoId, base_branch: &str, head: &CommitId) -> Result<CommitId, ClientError> {
        Ok(self.fetch_merge_base(repo, base_branch, head).await?)
    }

    #[instrument(level = "debug", skip_all, fields(repo = %repo, pull = %number))]
    async fn create_pull_comment(&self, repo: &RepoId, number: PullNumber, body: &str) -> Result<(), ClientError> {
        Ok(self.post_comment(repo, number, body).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(api_url: &str) -> GithubClient {
        GithubClient::new(
            &GithubConfig {
                api_url: api_url.into(),
                token: Some("t".into()),
            },
            Duration::from_secs(1),
        )
        .unwrap()
    }

    #[test]
    fn builds_endpoint_urls() {
        let c = client("https://api.github.com/");
        let repo: RepoId = "apache/arrow".parse().unwrap();
        let pull = PullNumber::new(123).unwrap();
        let head = CommitId::new("a".repeat(40)).unwrap();

        assert_eq!(c.pull_url(&repo, pull), "https://api.github.com/repos/apache/arrow/pulls/123");
        assert_eq!(
            c.comments_url(&repo, pull),
            "https://api.github.com/repos/apache/arrow/issues/123/comments"
        );
        assert_eq!(
            c.compare_url(&repo, "main", &head),
            format!("https://api.github.com/repos/apache/arrow/compare/main...{}", "a".repeat(40))
        );
    }

    #[test]
    fn empty_api_url_is_rejected() {
        let res = GithubClient::new(
            &GithubConfig {
                api_url: " ".into(),
                token: None,
            },
            Duration::from_secs(1),
        );
        assert!(matches!(res, Err(IntegrationError::InvalidConfig(_))));
    }

    #[test]
    fn config_defaults_to_public_api() {
        let cfg: GithubConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.api_url, DEFAULT_API_URL);
        assert!(cfg.token.is_none());
    }
}
