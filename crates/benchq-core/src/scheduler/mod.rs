//! Scheduling orchestrator.
//!
//! Turns a resolved `(repo, head, baseline, filters)` request into persisted
//! runs and build hand-offs. The duplicate check and run creation happen under
//! a per-key lock keyed by `(repo, commit, filters)` for both commits; the lock
//! is released before any build is triggered.
//!
//! A run left in `created` without a build reference by an earlier failed
//! trigger is handed out again by the next identical request; active runs on
//! the other side of that request are reported back instead of conflicting.
//! Runs are claimed while their trigger is in flight, so two requests never
//! hand the same run to the build system at once.
mod locks;
pub use locks::{KeyedGuard, KeyedLocks};

use std::{
    collections::HashSet,
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use benchq_model::{
    Benchmarkable, BuildRef, CommitId, FilterSpec, RepoId, Run, RunId, RunStatus, RunStatusUpdate,
};
use thiserror::Error;
use tracing::{Instrument, Span, debug, error, info, instrument, warn};

use crate::{
    clients::{BuildTrigger, ClientError, bounded},
    metrics::MetricsHandle,
    store::{BenchStore, StoreError},
};

type GuardKey = (RepoId, CommitId, FilterSpec);

/// Commits that already have active runs for the requested filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleConflict {
    conflicts: Vec<(CommitId, RunStatus)>,
}

impl ScheduleConflict {
    pub fn new(conflicts: Vec<(CommitId, RunStatus)>) -> Self {
        Self { conflicts }
    }

    pub fn conflicts(&self) -> &[(CommitId, RunStatus)] {
        &self.conflicts
    }
}

impl fmt::Display for ScheduleConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (commit, status)) in self.conflicts.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(
                f,
                "Commit {commit} already has scheduled benchmark runs (status: {status})."
            )?;
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Trigger(#[from] ClientError),

    /// The build exists but the store did not take its reference.
    #[error("build {build} started but not recorded: {source}")]
    Record { build: BuildRef, source: StoreError },
}

/// A build hand-off that did not succeed. The run stays `created`.
#[derive(Debug)]
pub struct TriggerFailure {
    pub run: RunId,
    pub commit: CommitId,
    pub error: DispatchError,
}

fn describe(failures: &[TriggerFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("run {} ({}): {}", f.run, f.commit.short(), f.error))
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("{0}")]
    CommitHasScheduledBenchmarkRuns(ScheduleConflict),

    #[error("build trigger failed: {}", describe(.failures))]
    Trigger {
        failures: Vec<TriggerFailure>,
        scheduled: Box<Scheduled>,
    },

    #[error("build dispatch aborted: {0}")]
    Dispatch(String),

    #[error("run not found: {0}")]
    RunNotFound(RunId),

    #[error("run {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: RunId,
        from: RunStatus,
        to: RunStatus,
    },

    #[error("status {0} requires a build reference")]
    MissingBuildRef(RunStatus),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone)]
pub struct ScheduleRequest {
    pub repo: RepoId,
    pub head: CommitId,
    pub baseline: CommitId,
    pub filters: FilterSpec,
}

/// Result of a scheduling decision: both benchmarkables and the runs handed to
/// the build system for them (one run when head and baseline coincide).
#[derive(Debug, Clone)]
pub struct Scheduled {
    pub baseline: Benchmarkable,
    pub head: Benchmarkable,
    pub runs: Vec<Run>,
}

struct Reservation {
    baseline: Benchmarkable,
    head: Benchmarkable,
    /// Active runs that already carry a build; reported, not triggered.
    settled: Vec<Run>,
    dispatch: Vec<Run>,
    created: usize,
}

/// Build hand-off, detached from the request that asked for it.
#[derive(Clone)]
struct Dispatcher {
    store: Arc<dyn BenchStore>,
    builds: Arc<dyn BuildTrigger>,
    metrics: MetricsHandle,
    /// Runs whose trigger is in flight, or whose build could not be recorded.
    claims: Arc<Mutex<HashSet<RunId>>>,
    timeout: Duration,
}

impl Dispatcher {
    fn claims(&self) -> MutexGuard<'_, HashSet<RunId>> {
        self.claims.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn dispatch(
        &self,
        runs: Vec<Run>,
        baseline: &Benchmarkable,
        head: &Benchmarkable,
    ) -> (Vec<Run>, Vec<TriggerFailure>) {
        let mut out = Vec::with_capacity(runs.len());
        let mut failures = Vec::new();
        for run in runs {
            let target = if run.commit == *head.id() { head } else { baseline };
            match self.trigger(&run, target).await {
                Ok(updated) => out.push(updated),
                Err(error) => {
                    failures.push(TriggerFailure {
                        run: run.id,
                        commit: run.commit.clone(),
                        error,
                    });
                    out.push(run);
                }
            }
        }
        (out, failures)
    }

    async fn trigger(&self, run: &Run, target: &Benchmarkable) -> Result<Run, DispatchError> {
        let build = match bounded("build trigger", self.timeout, self.builds.trigger(run, target)).await {
            Ok(build) => build,
            Err(e) => {
                self.metrics.record_build_trigger(false);
                warn!(run = %run.id, commit = %run.commit, error = %e, "build trigger failed");
                self.claims().remove(&run.id);
                return Err(e.into());
            }
        };
        self.metrics.record_build_trigger(true);

        match self.store.attach_build(&run.id, build.clone()) {
            Ok(updated) => {
                debug!(run = %run.id, build = %build, "build triggered");
                self.claims().remove(&run.id);
                Ok(updated)
            }
            // The claim stays: a build exists, so the run is never handed out again.
            Err(source) => {
                error!(run = %run.id, build = %build, error = %source, "build started but not recorded");
                Err(DispatchError::Record { build, source })
            }
        }
    }
}

/// Sole writer of the benchmark store.
pub struct Scheduler {
    locks: KeyedLocks<GuardKey>,
    dispatcher: Dispatcher,
}

impl Scheduler {
    pub fn new(
        store: Arc<dyn BenchStore>,
        builds: Arc<dyn BuildTrigger>,
        metrics: MetricsHandle,
        timeout: Duration,
    ) -> Self {
        Self {
            locks: KeyedLocks::new(),
            dispatcher: Dispatcher {
                store,
                builds,
                metrics,
                claims: Arc::default(),
                timeout,
            },
        }
    }

    /// Read access to the underlying store.
    pub fn store(&self) -> &Arc<dyn BenchStore> {
        &self.dispatcher.store
    }

    /// Reserve runs, then trigger them on a detached task.
    ///
    /// Dropping the returned future after the reservation does not abandon the
    /// triggers; they complete in the background.
    #[instrument(
        level = "debug",
        skip(self, req),
        fields(repo = %req.repo, head = %req.head.short(), baseline = %req.baseline.short(), filters = %req.filters)
    )]
    pub async fn schedule(&self, req: &ScheduleRequest) -> Result<Scheduled, ScheduleError> {
        let Reservation {
            baseline,
            head,
            settled,
            dispatch,
            created,
        } = self.reserve(req).await?;
        self.dispatcher.metrics.record_runs_created(created);
        info!(created, retried = dispatch.len() - created, "benchmark runs reserved");

        let dispatcher = self.dispatcher.clone();
        let (b, h) = (baseline.clone(), head.clone());
        let (triggered, failures) = tokio::spawn(
            async move { dispatcher.dispatch(dispatch, &b, &h).await }.instrument(Span::current()),
        )
        .await
        .map_err(|e| ScheduleError::Dispatch(e.to_string()))?;

        let mut runs = settled;
        runs.extend(triggered);

        let scheduled = Scheduled {
            baseline,
            head,
            runs,
        };
        if failures.is_empty() {
            Ok(scheduled)
        } else {
            Err(ScheduleError::Trigger {
                failures,
                scheduled: Box::new(scheduled),
            })
        }
    }

    /// Materialize, check and create under the per-key lock. Claims every
    /// returned run before the lock is released.
    async fn reserve(&self, req: &ScheduleRequest) -> Result<Reservation, ScheduleError> {
        let mut commits = vec![&req.baseline];
        if req.head != req.baseline {
            commits.push(&req.head);
        }

        let _guard = self
            .locks
            .lock(
                commits
                    .iter()
                    .map(|c| (req.repo.clone(), (*c).clone(), req.filters.clone())),
            )
            .await;

        let store = &self.dispatcher.store;
        let baseline = store.get_or_create_benchmarkable(&req.repo, &req.baseline)?;
        let head = store.get_or_create_benchmarkable(&req.repo, &req.head)?;

        let mut claims = self.dispatcher.claims();
        let mut conflicts = Vec::new();
        let mut settled = Vec::new();
        let mut dispatch = Vec::with_capacity(commits.len());
        let mut fresh = Vec::new();
        for commit in &commits {
            let (stranded, busy): (Vec<Run>, Vec<Run>) = store
                .active_runs(&req.repo, commit, &req.filters)?
                .into_iter()
                .partition(|r| {
                    r.status == RunStatus::Created && r.build_ref.is_none() && !claims.contains(&r.id)
                });
            if let Some(run) = stranded.into_iter().next() {
                dispatch.push(run);
            } else if !busy.is_empty() {
                conflicts.extend(busy.iter().map(|r| (r.commit.clone(), r.status)));
                settled.extend(busy);
            } else {
                let run = Run::created(req.repo.clone(), (*commit).clone(), req.filters.clone());
                fresh.push(run.clone());
                dispatch.push(run);
            }
        }
        let retried = dispatch.len() - fresh.len();
        if !conflicts.is_empty() && retried == 0 {
            let conflict = ScheduleConflict::new(conflicts);
            info!(%conflict, "duplicate benchmark request rejected");
            return Err(ScheduleError::CommitHasScheduledBenchmarkRuns(conflict));
        }

        store.insert_runs(&fresh)?;
        claims.extend(dispatch.iter().map(|r| r.id));

        Ok(Reservation {
            baseline,
            head,
            settled,
            dispatch,
            created: fresh.len(),
        })
    }

    /// Apply a status report from the build system.
    ///
    /// Terminal states are final and every state past `created` needs a build
    /// reference, either already attached or carried by `update`.
    #[instrument(level = "debug", skip(self, update), fields(status = %update.status))]
    pub async fn update_status(
        &self,
        id: &RunId,
        update: &RunStatusUpdate,
    ) -> Result<Run, ScheduleError> {
        let store = &self.dispatcher.store;
        let run = store
            .get_run(id)?
            .filter(|r| r.repo == update.repo)
            .ok_or(ScheduleError::RunNotFound(*id))?;

        let _guard = self
            .locks
            .lock([(run.repo.clone(), run.commit.clone(), run.filters.clone())])
            .await;

        // Re-read under the lock.
        let current = store.get_run(id)?.ok_or(ScheduleError::RunNotFound(*id))?;

        if !current.status.can_transition_to(update.status) {
            return Err(ScheduleError::InvalidTransition {
                id: *id,
                from: current.status,
                to: update.status,
            });
        }
        if update.status != RunStatus::Created
            && update.build_ref.is_none()
            && current.build_ref.is_none()
        {
            return Err(ScheduleError::MissingBuildRef(update.status));
        }

        let updated = store.set_status(id, update.status, update.build_ref.clone())?;
        info!(from = %current.status, to = %updated.status, "run status updated");
        Ok(updated)
    }
}
