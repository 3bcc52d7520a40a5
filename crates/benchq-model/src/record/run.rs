use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    BuildRef, CommitId, FilterSpec, RepoId, RunId,
    error::{ModelError, ModelResult},
};

/// Lifecycle status of a [`Run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Recorded, build not (yet successfully) triggered.
    Created,
    /// Accepted by the build system, waiting for an agent.
    Queued,
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    /// `completed` and `failed` never change again.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, RunStatus::Completed | RunStatus::Failed)
    }

    /// Non-terminal runs count against the duplicate-scheduling guard.
    pub const fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    /// Whether a run in this status may move to `next`.
    ///
    /// Reporting the current status again is accepted as a no-op.
    pub fn can_transition_to(&self, next: RunStatus) -> bool {
        use RunStatus::*;

        if *self == next {
            return true;
        }
        match self {
            Created => matches!(next, Queued | Running | Completed | Failed),
            Queued => matches!(next, Running | Completed | Failed),
            Running => matches!(next, Completed | Failed),
            Completed | Failed => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Created => "created",
            RunStatus::Queued => "queued",
            RunStatus::Running => "running",
            RunStatus::Completed => "completed",
            RunStatus::Failed => "failed",
        }
    }
}

impl FromStr for RunStatus {
    type Err = ModelError;
    fn from_str(s: &str) -> ModelResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "created" => Ok(RunStatus::Created),
            "queued" => Ok(RunStatus::Queued),
            "running" => Ok(RunStatus::Running),
            "completed" => Ok(RunStatus::Completed),
            "failed" => Ok(RunStatus::Failed),
            other => Err(ModelError::UnknownRunStatus(other.to_string())),
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A benchmark execution against one commit, scoped by a filter specification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    pub id: RunId,
    pub repo: RepoId,
    /// Owning benchmarkable commit.
    pub commit: CommitId,
    pub filters: FilterSpec,
    pub status: RunStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_ref: Option<BuildRef>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Run {
    /// New run in [`RunStatus::Created`] without a build reference.
    pub fn created(repo: RepoId, commit: CommitId, filters: FilterSpec) -> Self {
        Self {
            id: RunId::new(),
            repo,
            commit,
            filters,
            status: RunStatus::Created,
            build_ref: None,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}
