use crate::metrics::backend::{MetricsBackend, RequestOutcome};

/// Metrics backend that records nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpMetrics;

impl MetricsBackend for NoOpMetrics {
    #[inline(always)]
    fn record_request(&self, _: RequestOutcome, _: u64) {}

    #[inline(always)]
    fn record_runs_created(&self, _: usize) {}

    #[inline(always)]
    fn record_build_trigger(&self, _: bool) {}
}
