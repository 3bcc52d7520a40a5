use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use benchq_model::{Benchmarkable, BuildRef, CommitId, FilterSpec, RepoId, Run, RunId, RunStatus};

use super::{BenchStore, StoreError, StoreResult};

type CommitKey = (RepoId, CommitId);

/// Process-local store. Append-only for benchmarkables; runs are only updated
/// in place (status, build reference).
#[derive(Default)]
pub struct InMemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    benchmarkables: HashMap<CommitKey, Benchmarkable>,
    runs: HashMap<RunId, Run>,
    by_commit: HashMap<CommitKey, Vec<RunId>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Inner>> {
        self.inner.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Total number of runs, all commits.
    pub fn run_count(&self) -> StoreResult<usize> {
        Ok(self.lock()?.runs.len())
    }

    pub fn benchmarkable_count(&self) -> StoreResult<usize> {
        Ok(self.lock()?.benchmarkables.len())
    }
}

impl BenchStore for InMemoryStore {
    fn get_or_create_benchmarkable(&self, repo: &RepoId, commit: &CommitId) -> StoreResult<Benchmarkable> {
        let mut inner = self.lock()?;
        let b = inner
            .benchmarkables
            .entry((repo.clone(), commit.clone()))
            .or_insert_with(|| Benchmarkable::new(repo.clone(), commit.clone()));
        Ok(b.clone())
    }

    fn get_benchmarkable(&self, repo: &RepoId, commit: &CommitId) -> StoreResult<Option<Benchmarkable>> {
        let inner = self.lock()?;
        Ok(inner
            .benchmarkables
            .get(&(repo.clone(), commit.clone()))
            .cloned())
    }

    fn active_runs(&self, repo: &RepoId, commit: &CommitId, filters: &FilterSpec) -> StoreResult<Vec<Run>> {
        let inner = self.lock()?;
        let Some(ids) = inner.by_commit.get(&(repo.clone(), commit.clone())) else {
            return Ok(Vec::new());
        };
        Ok(ids
            .iter()
            .filter_map(|id| inner.runs.get(id))
            .filter(|r| r.is_active() && r.filters == *filters)
            .cloned()
            .collect())
    }

    fn insert_runs(&self, runs: &[Run]) -> StoreResult<()> {
        let mut inner = self.lock()?;
        if let Some(dup) = runs.iter().find(|r| inner.runs.contains_key(&r.id)) {
            return Err(StoreError::DuplicateRun(dup.id));
        }
        for run in runs {
            inner
                .by_commit
                .entry((run.repo.clone(), run.commit.clone()))
                .or_default()
                .push(run.id);
            inner.runs.insert(run.id, run.clone());
        }
        Ok(())
    }

    fn attach_build(&self, id: &RunId, build: BuildRef) -> StoreResult<Run> {
        let mut inner = self.lock()?;
        let run = inner.runs.get_mut(id).ok_or(StoreError::RunNotFound(*id))?;
        run.build_ref = Some(build);
        Ok(run.clone())
    }

    fn set_status(&self, id: &RunId, status: RunStatus, build: Option<BuildRef>) -> StoreResult<Run> {
        let mut inner = self.lock()?;
        let run = inner.runs.get_mut(id).ok_or(StoreError::RunNotFound(*id))?;
        run.status = status;
        if let Some(build) = build {
            run.build_ref = Some(build);
        }
        Ok(run.clone())
    }

    fn get_run(&self, id: &RunId) -> StoreResult<Option<Run>> {
        Ok(self.lock()?.runs.get(id).cloned())
    }

    fn runs_for_commit(&self, repo: &RepoId, commit: &CommitId) -> StoreResult<Vec<Run>> {
        let inner = self.lock()?;
        let mut runs: Vec<Run> = inner
            .by_commit
            .get(&(repo.clone(), commit.clone()))
            .into_iter()
            .flatten()
            .filter_map(|id| inner.runs.get(id).cloned())
            .collect();
        runs.sort_by_key(|r| r.created_at);
        Ok(runs)
    }
}
