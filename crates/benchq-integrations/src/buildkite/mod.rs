//! Buildkite REST client: one build per benchmark run.
mod wire;

use std::time::Duration;

use async_trait::async_trait;
use benchq_core::clients::{BuildTrigger, ClientError};
use benchq_model::{Benchmarkable, BuildRef, Run};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::{
    error::IntegrationError,
    http::{self, join},
};

pub use wire::CreateBuild;

const SERVICE: &str = "buildkite";
pub const DEFAULT_API_URL: &str = "https://api.buildkite.com";

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_branch() -> String {
    "main".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildkiteConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    pub org: String,
    pub pipeline: String,
    #[serde(default)]
    pub token: Option<String>,
    /// Branch label attached to created builds.
    #[serde(default = "default_branch")]
    pub branch: String,
}

pub struct BuildkiteClient {
    http: Client,
    builds_url: String,
    token: Option<String>,
    branch: String,
}

impl BuildkiteClient {
    pub fn new(cfg: &BuildkiteConfig, timeout: Duration) -> Result<Self, IntegrationError> {
        if cfg.org.trim().is_empty() || cfg.pipeline.trim().is_empty() {
            return Err(IntegrationError::InvalidConfig(
                "buildkite org and pipeline are required".into(),
            ));
        }
        Ok(Self {
            http: http::client(timeout)?,
            builds_url: join(
                &cfg.api_url,
                &format!("v2/organizations/{}/pipelines/{}/builds", cfg.org, cfg.pipeline),
            ),
            token: cfg.token.clone().filter(|t| !t.is_empty()),
            branch: cfg.branch.clone(),
        })
    }

    pub fn builds_url(&self) -> &str {
        &self.builds_url
    }

    async fn create_build(&self, body: &CreateBuild) -> Result<BuildRef, IntegrationError> {
        let mut req = self.http.post(&self.builds_url).json(body);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        let resp = req.send().await?;
        http::json::<wire::Build>(SERVICE, resp).await?.into_ref()
    }
}

#[async_trait]
impl BuildTrigger for BuildkiteClient {
    #[instrument(level = "debug", skip_all, fields(run = %run.id, commit = %target.id().short()))]
    async fn trigger(&self, run: &Run, target: &Benchmarkable) -> Result<BuildRef, ClientError> {
        let body = CreateBuild::for_run(run, target, &self.branch);
        let build = self.create_build(&body).await?;
        debug!(build = %build, "build created");
        Ok(build)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> BuildkiteConfig {
        serde_json::from_str(r#"{"org":"apache-arrow","pipeline":"arrow-bci-benchmark"}"#).unwrap()
    }

    #[test]
    fn builds_url_from_config() {
        let c = BuildkiteClient::new(&cfg(), Duration::from_secs(1)).unwrap();
        assert_eq!(
            c.builds_url(),
            "https://api.buildkite.com/v2/organizations/apache-arrow/pipelines/arrow-bci-benchmark/builds"
        );
    }

    #[test]
    fn org_and_pipeline_are_required() {
        let mut bad = cfg();
        bad.pipeline = String::new();
        assert!(matches!(
            BuildkiteClient::new(&bad, Duration::from_secs(1)),
            Err(IntegrationError::InvalidConfig(_))
        ));
    }

    #[test]
    fn config_defaults() {
        let c = cfg();
        assert_eq!(c.api_url, DEFAULT_API_URL);
        assert_eq!(c.branch, "main");
        assert!(c.token.is_none());
    }
}
