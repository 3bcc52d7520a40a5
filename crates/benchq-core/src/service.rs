//! Request handling: validation, authentication, command parsing, baseline
//! resolution, scheduling and notification, in that order.
use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use benchq_model::{BenchmarkTrigger, CommitId, RepoId, Run, RunId, RunStatusUpdate};
use serde::Serialize;
use tracing::{Span, error, field, info, instrument, warn};

use crate::{
    baseline::BaselineResolver,
    clients::{BuildTrigger, ClientError, RepositoryClient, bounded},
    command::CommandParser,
    config::ConfigProvider,
    error::ServiceError,
    metrics::{MetricsHandle, RequestOutcome},
    notify::{Links, Notifier},
    scheduler::{ScheduleError, ScheduleRequest, Scheduler},
    signature::verify_signature,
    store::BenchStore,
};

/// Success body of a benchmark request.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleReceipt {
    pub success: bool,
    /// Head commit of the pull request.
    pub commit: CommitId,
    pub baseline_commit: CommitId,
    #[serde(skip)]
    pub runs: Vec<Run>,
}

/// Service-level settings.
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub bot_handle: String,
    pub links: Links,
    /// Upper bound for every external call.
    pub call_timeout: Duration,
}

/// External collaborators the service is wired to.
pub struct Collaborators {
    pub config: Arc<dyn ConfigProvider>,
    pub repos: Arc<dyn RepositoryClient>,
    pub builds: Arc<dyn BuildTrigger>,
    pub store: Arc<dyn BenchStore>,
    pub metrics: MetricsHandle,
}

pub struct BenchmarkService {
    config: Arc<dyn ConfigProvider>,
    repos: Arc<dyn RepositoryClient>,
    parser: CommandParser,
    resolver: BaselineResolver,
    scheduler: Scheduler,
    notifier: Notifier,
    metrics: MetricsHandle,
    timeout: Duration,
}

impl BenchmarkService {
    pub fn new(settings: ServiceSettings, deps: Collaborators) -> Self {
        let timeout = settings.call_timeout;
        Self {
            parser: CommandParser::new(&settings.bot_handle),
            resolver: BaselineResolver::new(deps.repos.clone(), timeout),
            scheduler: Scheduler::new(deps.store, deps.builds, deps.metrics.clone(), timeout),
            notifier: Notifier::new(deps.repos.clone(), settings.links, timeout),
            config: deps.config,
            repos: deps.repos,
            metrics: deps.metrics,
            timeout,
        }
    }

    pub fn parser(&self) -> &CommandParser {
        &self.parser
    }

    /// Handle `POST /api/v1/benchmarks`. `body` must be the raw request bytes
    /// since the signature covers them.
    #[instrument(name = "benchmark_request", skip_all, fields(repo = field::Empty, pull = field::Empty))]
    pub async fn handle_trigger(
        &self,
        body: &[u8],
        signature: Option<&str>,
    ) -> Result<ScheduleReceipt, ServiceError> {
        let started = Instant::now();
        let res = self.trigger(body, signature).await;

        let outcome = match &res {
            Ok(_) => RequestOutcome::Scheduled,
            Err(e) => e.outcome(),
        };
        self.metrics
            .record_request(outcome, started.elapsed().as_millis() as u64);

        match &res {
            Ok(receipt) => info!(
                commit = %receipt.commit,
                baseline = %receipt.baseline_commit,
                "benchmark runs scheduled"
            ),
            Err(e) => match outcome {
                RequestOutcome::Internal => error!(error = %e, "benchmark request failed"),
                RequestOutcome::Unauthorized => warn!(error = %e, "signature verification failed"),
                _ => info!(outcome = outcome.as_label(), error = %e, "benchmark request rejected"),
            },
        }
        res
    }

    async fn trigger(&self, body: &[u8], signature: Option<&str>) -> Result<ScheduleReceipt, ServiceError> {
        let trigger = BenchmarkTrigger::from_slice(body)?;
        let span = Span::current();
        span.record("repo", field::display(&trigger.repo));
        span.record("pull", trigger.pull_number.get());

        let repo = &trigger.repo;
        let number = trigger.pull_number;

        let secret = self.config.benchmark_secret(repo)?;
        verify_signature(body, signature, secret.expose())?;

        let filters = match self.parser.parse(&self.parser.compose(&trigger.filters)) {
            Ok(filters) => filters,
            Err(reason) => {
                let usage = self.parser.usage();
                self.report(self.notifier.unsupported(repo, number, &usage).await);
                return Err(ServiceError::UnsupportedBenchmarkCommand { reason });
            }
        };

        let pull = bounded(
            "pull request lookup",
            self.timeout,
            self.repos.get_pull(repo, number),
        )
        .await
        .map_err(|e| ServiceError::Internal(format!("failed to fetch pull request {number}: {e}")))?;

        let baseline = self.resolver.resolve(repo, &pull).await?;

        let req = ScheduleRequest {
            repo: repo.clone(),
            head: pull.head_commit.clone(),
            baseline,
            filters,
        };
        let scheduled = match self.scheduler.schedule(&req).await {
            Ok(scheduled) => scheduled,
            Err(ScheduleError::CommitHasScheduledBenchmarkRuns(conflict)) => {
                self.report(self.notifier.conflict(repo, number, &conflict).await);
                return Err(ServiceError::CommitHasScheduledBenchmarkRuns(conflict));
            }
            Err(e) => return Err(e.into()),
        };

        self.notifier
            .scheduled(repo, number, scheduled.head.id(), scheduled.baseline.id())
            .await
            .map_err(|e| ServiceError::Internal(format!("runs scheduled but comment failed: {e}")))?;

        Ok(ScheduleReceipt {
            success: true,
            commit: scheduled.head.id().clone(),
            baseline_commit: scheduled.baseline.id().clone(),
            runs: scheduled.runs,
        })
    }

    /// A rejection comment that cannot be posted does not change the outcome.
    fn report(&self, posted: Result<(), ClientError>) {
        if let Err(error) = posted {
            warn!(%error, "failed to post outcome comment");
        }
    }

    /// Handle a signed run status report from the build system.
    #[instrument(name = "run_status_update", skip_all, fields(run = %id))]
    pub async fn handle_status_update(
        &self,
        id: &RunId,
        body: &[u8],
        signature: Option<&str>,
    ) -> Result<Run, ServiceError> {
        let update: RunStatusUpdate = serde_json::from_slice(body)
            .map_err(|e| ServiceError::BadRequest(format!("invalid status update: {e}")))?;

        let secret = self.config.signing_secret(&update.repo)?;
        if let Err(e) = verify_signature(body, signature, secret.expose()) {
            warn!(error = %e, "signature verification failed");
            return Err(e.into());
        }

        Ok(self.scheduler.update_status(id, &update).await?)
    }

    pub fn run(&self, id: &RunId) -> Result<Run, ServiceError> {
        self.scheduler
            .store()
            .get_run(id)?
            .ok_or_else(|| ServiceError::NotFound(format!("run {id} not found")))
    }

    /// Runs of a commit, oldest first. Commits never benchmarked are not found.
    pub fn runs_for_commit(&self, repo: &RepoId, commit: &CommitId) -> Result<Vec<Run>, ServiceError> {
        let store = self.scheduler.store();
        if store.get_benchmarkable(repo, commit)?.is_none() {
            return Err(ServiceError::NotFound(format!("commit {commit} of {repo} not found")));
        }
        Ok(store.runs_for_commit(repo, commit)?)
    }
}
