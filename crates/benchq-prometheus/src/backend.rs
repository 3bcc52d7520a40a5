use std::sync::Arc;

use prometheus::{
    CounterVec, Encoder, Histogram, HistogramOpts, IntCounter, Opts, Registry, TextEncoder,
    proto::MetricFamily,
};

use benchq_core::metrics::{MetricsBackend, RequestOutcome};

const NAMESPACE: &str = "benchq";

/// Label cardinality is bounded: `outcome` takes the [`RequestOutcome`]
/// labels for requests and `ok`/`error` for build triggers.
#[derive(Clone)]
pub struct PrometheusMetrics {
    requests: CounterVec,
    request_duration: Histogram,
    runs_created: IntCounter,
    build_triggers: CounterVec,
    registry: Arc<Registry>,
}

impl PrometheusMetrics {
    pub fn new_with_registry(registry: Arc<Registry>) -> Result<Self, prometheus::Error> {
        let requests = CounterVec::new(
            Opts::new("requests_total", "Benchmark requests by outcome").namespace(NAMESPACE),
            &["outcome"],
        )?;
        registry.register(Box::new(requests.clone()))?;

        let request_duration = Histogram::with_opts(
            HistogramOpts::new(
                "request_duration_seconds",
                "Benchmark request handling time in seconds",
            )
            .namespace(NAMESPACE)
            .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        )?;
        registry.register(Box::new(request_duration.clone()))?;

        let runs_created = IntCounter::with_opts(
            Opts::new("runs_created_total", "Benchmark runs persisted").namespace(NAMESPACE),
        )?;
        registry.register(Box::new(runs_created.clone()))?;

        let build_triggers = CounterVec::new(
            Opts::new("build_triggers_total", "Build system hand-offs by outcome").namespace(NAMESPACE),
            &["outcome"],
        )?;
        registry.register(Box::new(build_triggers.clone()))?;

        Ok(Self {
            requests,
            request_duration,
            runs_created,
            build_triggers,
            registry,
        })
    }

    pub fn new() -> Result<Self, prometheus::Error> {
        Self::new_with_registry(Arc::new(Registry::new()))
    }

    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }

    /// Text exposition format plus its content type.
    pub fn render(&self) -> Result<(String, String), prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buf = Vec::new();
        encoder.encode(&self.gather(), &mut buf)?;
        let body = String::from_utf8(buf).map_err(|e| prometheus::Error::Msg(e.to_string()))?;
        Ok((body, encoder.format_type().to_string()))
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }
}

impl MetricsBackend for PrometheusMetrics {
    fn record_request(&self, outcome: RequestOutcome, duration_ms: u64) {
        self.requests.with_label_values(&[outcome.as_label()]).inc();
        self.request_duration.observe(duration_ms as f64 / 1000.0);
    }

    fn record_runs_created(&self, count: usize) {
        self.runs_created.inc_by(count as u64);
    }

    fn record_build_trigger(&self, ok: bool) {
        let outcome = if ok { "ok" } else { "error" };
        self.build_triggers.with_label_values(&[outcome]).inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn family<'a>(families: &'a [MetricFamily], name: &str) -> &'a MetricFamily {
        families
            .iter()
            .find(|f| f.name() == name)
            .unwrap_or_else(|| panic!("{name} not found"))
    }

    #[test]
    fn requests_are_labelled_by_outcome() {
        let m = PrometheusMetrics::new().unwrap();

        m.record_request(RequestOutcome::Scheduled, 120);
        m.record_request(RequestOutcome::Conflict, 15);
        m.record_request(RequestOutcome::Conflict, 10);

        let families = m.gather();
        assert_eq!(family(&families, "benchq_requests_total").get_metric().len(), 2);
        assert_eq!(
            family(&families, "benchq_request_duration_seconds").get_metric().len(),
            1
        );
    }

    #[test]
    fn runs_and_triggers_are_counted() {
        let m = PrometheusMetrics::new().unwrap();

        m.record_runs_created(2);
        m.record_build_trigger(true);
        m.record_build_trigger(false);

        assert_eq!(m.runs_created.get(), 2);
        let families = m.gather();
        assert_eq!(family(&families, "benchq_build_triggers_total").get_metric().len(), 2);
    }

    #[test]
    fn render_produces_text_format() {
        let m = PrometheusMetrics::new().unwrap();
        m.record_runs_created(1);

        let (body, content_type) = m.render().unwrap();
        assert!(body.contains("benchq_runs_created_total 1"));
        assert!(content_type.starts_with("text/plain"));
    }

    #[test]
    fn registering_twice_on_one_registry_fails() {
        let registry = Arc::new(Registry::new());
        PrometheusMetrics::new_with_registry(registry.clone()).unwrap();
        assert!(PrometheusMetrics::new_with_registry(registry).is_err());
    }
}
