use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{CommitId, RepoId};

/// A commit eligible for benchmarking.
///
/// Identified by `(repo, commit)`; never mutated once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Benchmarkable {
    pub repo: RepoId,
    pub commit: CommitId,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Benchmarkable {
    pub fn new(repo: RepoId, commit: CommitId) -> Self {
        Self {
            repo,
            commit,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    /// The commit id; benchmarkables are referred to by commit in messages and responses.
    #[inline]
    pub fn id(&self) -> &CommitId {
        &self.commit
    }
}
