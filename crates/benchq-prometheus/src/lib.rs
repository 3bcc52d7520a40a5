//! Prometheus backend for [`benchq_core::metrics::MetricsBackend`].
//!
//! ## Metrics
//! - `benchq_requests_total{outcome}` - Counter
//! - `benchq_request_duration_seconds` - Histogram
//! - `benchq_runs_created_total` - Counter
//! - `benchq_build_triggers_total{outcome}` - Counter
//!
//! Exposition is left to the HTTP layer: call [`PrometheusMetrics::render`]
//! from a `/metrics` handler.
mod backend;
pub use backend::PrometheusMetrics;

pub use prometheus::{Registry, TextEncoder};
