use serde::{Deserialize, Serialize};

use crate::{BuildRef, RepoId, RunStatus};

/// Status report sent by the build system for one run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunStatusUpdate {
    /// Repository whose secret signs the report.
    pub repo: RepoId,
    pub status: RunStatus,
    /// Build reference, if the reporter knows it and the run has none yet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_ref: Option<BuildRef>,
}
