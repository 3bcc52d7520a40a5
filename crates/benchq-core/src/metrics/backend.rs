use std::sync::Arc;

/// How a benchmark request ended, for metrics classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// Runs were created and the pull request was notified.
    Scheduled,
    /// Payload or configuration problem.
    BadRequest,
    /// Signature verification failed.
    Unauthorized,
    /// The command did not parse.
    UnsupportedCommand,
    /// Duplicate guard rejected the request.
    Conflict,
    /// Collaborator or storage failure.
    Internal,
}

impl RequestOutcome {
    /// Return label value for metrics.
    #[inline]
    pub fn as_label(&self) -> &'static str {
        match self {
            RequestOutcome::Scheduled => "scheduled",
            RequestOutcome::BadRequest => "bad_request",
            RequestOutcome::Unauthorized => "unauthorized",
            RequestOutcome::UnsupportedCommand => "unsupported_command",
            RequestOutcome::Conflict => "conflict",
            RequestOutcome::Internal => "internal",
        }
    }
}

/// Backend metrics collection interface.
pub trait MetricsBackend: Send + Sync + 'static {
    /// Record a finished benchmark request.
    ///
    /// # Arguments
    /// - `outcome`: How the request ended
    /// - `duration_ms`: Wall time spent handling it
    fn record_request(&self, outcome: RequestOutcome, duration_ms: u64);
    /// Record runs persisted by one scheduling decision.
    fn record_runs_created(&self, count: usize);
    /// Record one build system hand-off.
    fn record_build_trigger(&self, ok: bool);
}

/// Shared handle to metrics backend.
pub type MetricsHandle = Arc<dyn MetricsBackend>;
