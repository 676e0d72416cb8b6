//! The capability surface recorders need from the metric backend:
//! construction options for registered handles, and update helpers that
//! swallow backend errors so a bad label set degrades one measurement
//! instead of failing the instrumented operation.

use prometheus::core::Collector;
use prometheus::{CounterVec, GaugeVec, HistogramOpts, HistogramVec, Opts};
use tracing::warn;

use crate::config::MonitoringConfig;
use crate::utils::log_throttle;

/// Default latency buckets in milliseconds, 1ms to 10s.
pub const DEFAULT_LATENCY_BUCKETS_MILLIS: &[f64] = &[
    1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0, 10000.0,
];

/// Default payload-size buckets in bytes, 64B to 4MiB.
pub const DEFAULT_SIZE_BUCKETS_BYTES: &[f64] = &[
    64.0, 256.0, 1024.0, 4096.0, 16384.0, 65536.0, 262144.0, 1048576.0, 4194304.0,
];

/// Construction-time options shared by every recorder family.
#[derive(Debug, Clone)]
pub struct BackendOpts {
    /// Optional prefix prepended to every metric name.
    pub namespace: Option<String>,
    pub latency_buckets_millis: Vec<f64>,
    pub size_buckets_bytes: Vec<f64>,
}

impl Default for BackendOpts {
    fn default() -> Self {
        BackendOpts {
            namespace: None,
            latency_buckets_millis: DEFAULT_LATENCY_BUCKETS_MILLIS.to_vec(),
            size_buckets_bytes: DEFAULT_SIZE_BUCKETS_BYTES.to_vec(),
        }
    }
}

impl BackendOpts {
    pub fn from_config(config: &MonitoringConfig) -> Self {
        BackendOpts {
            namespace: config.namespace.clone(),
            latency_buckets_millis: config
                .latency_buckets_millis
                .clone()
                .unwrap_or_else(|| DEFAULT_LATENCY_BUCKETS_MILLIS.to_vec()),
            size_buckets_bytes: config
                .size_buckets_bytes
                .clone()
                .unwrap_or_else(|| DEFAULT_SIZE_BUCKETS_BYTES.to_vec()),
        }
    }

    pub(crate) fn opts(&self, name: &str, help: &str) -> Opts {
        let opts = Opts::new(name, help);
        match &self.namespace {
            Some(ns) => opts.namespace(ns.as_str()),
            None => opts,
        }
    }

    pub(crate) fn latency_opts(&self, name: &str, help: &str) -> HistogramOpts {
        self.histogram_opts(name, help, self.latency_buckets_millis.clone())
    }

    pub(crate) fn size_opts(&self, name: &str, help: &str) -> HistogramOpts {
        self.histogram_opts(name, help, self.size_buckets_bytes.clone())
    }

    fn histogram_opts(&self, name: &str, help: &str, buckets: Vec<f64>) -> HistogramOpts {
        let opts = HistogramOpts::new(name, help).buckets(buckets);
        match &self.namespace {
            Some(ns) => opts.namespace(ns.as_str()),
            None => opts,
        }
    }
}

/// Increments `counter` at `label_values`; a rejected update is dropped.
pub(crate) fn inc_counter(counter: &CounterVec, label_values: &[&str]) {
    match counter.get_metric_with_label_values(label_values) {
        Ok(metric) => metric.inc(),
        Err(err) => dropped_update(counter, err),
    }
}

/// Observes `value` on `histogram` at `label_values`; a rejected update is
/// dropped.
pub(crate) fn observe(histogram: &HistogramVec, label_values: &[&str], value: f64) {
    match histogram.get_metric_with_label_values(label_values) {
        Ok(metric) => metric.observe(value),
        Err(err) => dropped_update(histogram, err),
    }
}

/// Sets `gauge` at `label_values` to `value`; a rejected update is dropped.
pub(crate) fn set_gauge(gauge: &GaugeVec, label_values: &[&str], value: f64) {
    match gauge.get_metric_with_label_values(label_values) {
        Ok(metric) => metric.set(value),
        Err(err) => dropped_update(gauge, err),
    }
}

fn dropped_update<C: Collector>(collector: &C, err: prometheus::Error) {
    let descs = collector.desc();
    let name = descs.first().map(|d| d.fq_name.as_str()).unwrap_or("unknown");
    if let Some(suppressed) = log_throttle::should_emit(name, log_throttle::DEFAULT_WINDOW) {
        warn!(
            "Dropped update for metric '{}' ({} suppressed since last report): {}",
            name, suppressed, err
        );
    }
}
