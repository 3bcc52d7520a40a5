//! Daemon configuration file.
use std::{fs, net::SocketAddr, path::Path, time::Duration};

use anyhow::{Context, bail};
use benchq_core::prelude::{Links, StaticConfigProvider};
use benchq_integrations::{BuildkiteConfig, GithubConfig};
use benchq_observe::LoggerConfig;
use serde::Deserialize;

fn default_listen() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 5000))
}

fn default_bot_handle() -> String {
    "ursabot".to_string()
}

fn default_call_timeout_ms() -> u64 {
    10_000
}

#[derive(Debug, Clone, Deserialize)]
pub struct DaemonConfig {
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,
    #[serde(default)]
    pub logger: LoggerConfig,
    /// Handle the benchmark command must address, without `@`.
    #[serde(default = "default_bot_handle")]
    pub bot_handle: String,
    pub links: Links,
    #[serde(default)]
    pub github: GithubConfig,
    pub buildkite: BuildkiteConfig,
    /// Upper bound for each call to GitHub or Buildkite.
    #[serde(default = "default_call_timeout_ms")]
    pub call_timeout_ms: u64,
    #[serde(default)]
    pub repos: StaticConfigProvider,
}

impl DaemonConfig {
    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        let cfg: DaemonConfig = serde_json::from_str(raw).context("malformed config")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("cannot read config {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("invalid config {}", path.display()))
    }

    /// Fill API tokens the file leaves out.
    pub fn with_tokens(mut self, github: Option<String>, buildkite: Option<String>) -> Self {
        if self.github.token.is_none() {
            self.github.token = github.filter(|t| !t.is_empty());
        }
        if self.buildkite.token.is_none() {
            self.buildkite.token = buildkite.filter(|t| !t.is_empty());
        }
        self
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.call_timeout_ms == 0 {
            bail!("call_timeout_ms must be positive");
        }
        if self.bot_handle.trim().is_empty() || self.bot_handle.starts_with('@') {
            bail!("bot_handle must be a bare handle, got {:?}", self.bot_handle);
        }
        if self.buildkite.org.is_empty() || self.buildkite.pipeline.is_empty() {
            bail!("buildkite.org and buildkite.pipeline are required");
        }
        Ok(())
    }
}
