//! Per-repository settings provider.
//!
//! Settings are loaded once at startup and injected into the service; nothing
//! reads configuration from global state.
use std::{collections::HashMap, fmt};

use benchq_model::RepoId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Repo {0} not configured")]
    UnknownRepo(RepoId),

    #[error("Repo {0} has no github_secret configured")]
    MissingSecret(RepoId),

    #[error("Benchmarking not enabled for {0}")]
    BenchmarkingDisabled(RepoId),
}

/// Shared webhook secret. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn expose(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(<redacted>)")
    }
}

/// Settings for one repository as written in the config file.
///
/// Both fields are optional on the wire so that a missing value is reported as
/// a configuration error rather than a parse failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepoSettings {
    #[serde(default)]
    pub github_secret: Option<Secret>,
    #[serde(default)]
    pub enable_benchmarking_for_pull_requests: Option<bool>,
}

/// Source of per-repository settings.
pub trait ConfigProvider: Send + Sync + 'static {
    fn repo(&self, repo: &RepoId) -> Option<RepoSettings>;

    /// Secret for a repository that has benchmarking enabled.
    fn benchmark_secret(&self, repo: &RepoId) -> Result<Secret, ConfigError> {
        let settings = self
            .repo(repo)
            .ok_or_else(|| ConfigError::UnknownRepo(repo.clone()))?;
        let secret = settings
            .github_secret
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ConfigError::MissingSecret(repo.clone()))?;
        if settings.enable_benchmarking_for_pull_requests != Some(true) {
            return Err(ConfigError::BenchmarkingDisabled(repo.clone()));
        }
        Ok(secret)
    }

    /// Secret for a repository regardless of the benchmarking flag.
    fn signing_secret(&self, repo: &RepoId) -> Result<Secret, ConfigError> {
        self.repo(repo)
            .ok_or_else(|| ConfigError::UnknownRepo(repo.clone()))?
            .github_secret
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ConfigError::MissingSecret(repo.clone()))
    }
}

/// Immutable in-memory provider built from the loaded config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaticConfigProvider {
    repos: HashMap<RepoId, RepoSettings>,
}

impl StaticConfigProvider {
    pub fn new(repos: HashMap<RepoId, RepoSettings>) -> Self {
        Self { repos }
    }

    pub fn len(&self) -> usize {
        self.repos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repos.is_empty()
    }
}

impl ConfigProvider for StaticConfigProvider {
    fn repo(&self, repo: &RepoId) -> Option<RepoSettings> {
        self.repos.get(repo).cloned()
    }
}
