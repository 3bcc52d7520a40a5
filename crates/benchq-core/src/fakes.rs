//! In-memory collaborators for tests.
use std::{
    collections::{HashMap, HashSet},
    sync::{
        Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use benchq_model::{
    Benchmarkable, BuildRef, CommitId, FilterSpec, PullNumber, PullRequest, RepoId, Run, RunId,
    RunStatus,
};

use crate::{
    clients::{BuildTrigger, ClientError, RepositoryClient},
    store::{BenchStore, InMemoryStore, StoreError, StoreResult},
};

/// 40-char commit made of one repeated hex digit.
pub fn commit(c: char) -> CommitId {
    CommitId::new(c.to_string().repeat(40)).unwrap()
}

pub fn pull(number: u64, head: char, base: char) -> PullRequest {
    PullRequest {
        number: PullNumber::new(number).unwrap(),
        head_commit: commit(head),
        base_branch: "main".to_string(),
        base_commit: commit(base),
    }
}

#[derive(Default)]
pub struct FakeRepos {
    pulls: Mutex<HashMap<PullNumber, PullRequest>>,
    merge_bases: Mutex<HashMap<CommitId, CommitId>>,
    pub comments: Mutex<Vec<(RepoId, PullNumber, String)>>,
    pub calls: AtomicUsize,
    pub fail_comments: AtomicBool,
}

impl FakeRepos {
    pub fn set_pull(&self, pull: PullRequest) {
        self.pulls.lock().unwrap().insert(pull.number, pull);
    }

    pub fn set_merge_base(&self, head: &CommitId, base: CommitId) {
        self.merge_bases.lock().unwrap().insert(head.clone(), base);
    }

    pub fn comments(&self) -> Vec<String> {
        self.comments
            .lock()
            .unwrap()
            .iter()
            .map(|(_, _, body)| body.clone())
            .collect()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RepositoryClient for FakeRepos {
    async fn get_pull(&self, _repo: &RepoId, number: PullNumber) -> Result<PullRequest, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.pulls
            .lock()
            .unwrap()
            .get(&number)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("pull {number}")))
    }

    async fn merge_base(
        &self,
        _repo: &RepoId,
        _base_branch: &str,
        head: &CommitId,
    ) -> Result<CommitId, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.merge_bases
            .lock()
            .unwrap()
            .get(head)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("no merge base for {head}")))
    }

    async fn create_pull_comment(
        &self,
        repo: &RepoId,
        number: PullNumber,
        body: &str,
    ) -> Result<(), ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_comments.load(Ordering::SeqCst) {
            return Err(ClientError::Transport("comment endpoint down".into()));
        }
        self.comments
            .lock()
            .unwrap()
            .push((repo.clone(), number, body.to_string()));
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeBuilds {
    pub triggered: Mutex<Vec<RunId>>,
    fail_for: Mutex<HashSet<CommitId>>,
    delay: Mutex<Option<Duration>>,
}

impl FakeBuilds {
    pub fn fail_for(&self, commit: CommitId) {
        self.fail_for.lock().unwrap().insert(commit);
    }

    pub fn recover(&self, commit: &CommitId) {
        self.fail_for.lock().unwrap().remove(commit);
    }

    pub fn with_delay(self, delay: Duration) -> Self {
        *self.delay.lock().unwrap() = Some(delay);
        self
    }

    pub fn triggered(&self) -> Vec<RunId> {
        self.triggered.lock().unwrap().clone()
    }
}

#[async_trait]
impl BuildTrigger for FakeBuilds {
    async fn trigger(&self, run: &Run, _target: &Benchmarkable) -> Result<BuildRef, ClientError> {
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.triggered.lock().unwrap().push(run.id);
        if self.fail_for.lock().unwrap().contains(&run.commit) {
            return Err(ClientError::Rejected {
                status: 422,
                message: "pipeline is paused".into(),
            });
        }
        Ok(BuildRef::new(format!("https://buildkite.com/org/bench/builds/{}", run.id))
            .expect("non-empty"))
    }
}

/// In-memory store whose `attach_build` can be made to fail.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: InMemoryStore,
    pub fail_attach: AtomicBool,
}

impl BenchStore for FlakyStore {
    fn get_or_create_benchmarkable(&self, repo: &RepoId, commit: &CommitId) -> StoreResult<Benchmarkable> {
        self.inner.get_or_create_benchmarkable(repo, commit)
    }

    fn get_benchmarkable(&self, repo: &RepoId, commit: &CommitId) -> StoreResult<Option<Benchmarkable>> {
        self.inner.get_benchmarkable(repo, commit)
    }

    fn active_runs(&self, repo: &RepoId, commit: &CommitId, filters: &FilterSpec) -> StoreResult<Vec<Run>> {
        self.inner.active_runs(repo, commit, filters)
    }

    fn insert_runs(&self, runs: &[Run]) -> StoreResult<()> {
        self.inner.insert_runs(runs)
    }

    fn attach_build(&self, id: &RunId, build: BuildRef) -> StoreResult<Run> {
        if self.fail_attach.load(Ordering::SeqCst) {
            return Err(StoreError::Poisoned);
        }
        self.inner.attach_build(id, build)
    }

    fn set_status(&self, id: &RunId, status: RunStatus, build: Option<BuildRef>) -> StoreResult<Run> {
        self.inner.set_status(id, status, build)
    }

    fn get_run(&self, id: &RunId) -> StoreResult<Option<Run>> {
        self.inner.get_run(id)
    }

    fn runs_for_commit(&self, repo: &RepoId, commit: &CommitId) -> StoreResult<Vec<Run>> {
        self.inner.runs_for_commit(repo, commit)
    }
}
