//! Metrics collection abstraction for the benchmark service.
//!
//! Backends (prometheus, ...) implement [`MetricsBackend`] and are handed to
//! the service and the scheduler at construction time.
mod backend;
pub use backend::{MetricsBackend, MetricsHandle, RequestOutcome};

mod noop;
pub use noop::NoOpMetrics;

use std::sync::Arc;

/// Create a no-op metrics handle.
#[inline]
pub fn noop_metrics() -> MetricsHandle {
    Arc::new(NoOpMetrics)
}
