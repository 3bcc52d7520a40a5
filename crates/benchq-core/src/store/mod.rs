//! Benchmarkable / run persistence.
//!
//! The scheduler is the only writer. Individual operations are atomic; the
//! scheduler provides cross-operation atomicity with its keyed locks.
mod memory;
pub use memory::InMemoryStore;

use benchq_model::{Benchmarkable, BuildRef, CommitId, FilterSpec, RepoId, Run, RunId, RunStatus};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("run not found: {0}")]
    RunNotFound(RunId),

    #[error("run already exists: {0}")]
    DuplicateRun(RunId),

    #[error("store lock poisoned")]
    Poisoned,
}

pub type StoreResult<T> = Result<T, StoreError>;

pub trait BenchStore: Send + Sync + 'static {
    /// Return the benchmarkable for `(repo, commit)`, creating it on first reference.
    fn get_or_create_benchmarkable(&self, repo: &RepoId, commit: &CommitId) -> StoreResult<Benchmarkable>;

    fn get_benchmarkable(&self, repo: &RepoId, commit: &CommitId) -> StoreResult<Option<Benchmarkable>>;

    /// Non-terminal runs of `(repo, commit)` whose filter specification equals `filters`.
    fn active_runs(&self, repo: &RepoId, commit: &CommitId, filters: &FilterSpec) -> StoreResult<Vec<Run>>;

    /// Insert all runs or none of them.
    fn insert_runs(&self, runs: &[Run]) -> StoreResult<()>;

    /// Record the build reference returned by the build system.
    fn attach_build(&self, id: &RunId, build: BuildRef) -> StoreResult<Run>;

    /// Overwrite status (and build reference, when given). Transition rules are
    /// enforced by the caller.
    fn set_status(&self, id: &RunId, status: RunStatus, build: Option<BuildRef>) -> StoreResult<Run>;

    fn get_run(&self, id: &RunId) -> StoreResult<Option<Run>>;

    /// All runs of a commit, oldest first.
    fn runs_for_commit(&self, repo: &RepoId, commit: &CommitId) -> StoreResult<Vec<Run>>;
}
