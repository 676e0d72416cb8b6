//! Datastore operation metrics: per-operation counts and latency.

use prometheus::{
    register_counter_vec_with_registry, register_histogram_vec_with_registry, CounterVec,
    HistogramVec, Registry,
};

use super::base::{Span, LABEL_NONE, STATUS_FAILURE, STATUS_SUCCESS};
use crate::backend::{self, BackendOpts};
use crate::models::ClassifiedError;

const OPERATION_LABELS: [&str; 3] = ["operation", "status", "error_code"];
const LATENCY_LABELS: [&str; 2] = ["operation", "status"];

/// Dimension values for one datastore operation.
#[derive(Debug, Clone, Copy)]
pub struct DbLabels<'a> {
    /// Logical operation name, e.g. "read" or "insert_many".
    pub operation: &'a str,
}

impl<'a> DbLabels<'a> {
    pub fn new(operation: &'a str) -> Self {
        DbLabels { operation }
    }

    fn operation_values<'v>(&self, status: &'v str, error_code: &'v str) -> [&'v str; 3]
    where
        'a: 'v,
    {
        [self.operation, status, error_code]
    }

    fn latency_values<'v>(&self, status: &'v str) -> [&'v str; 2]
    where
        'a: 'v,
    {
        [self.operation, status]
    }
}

/// Records datastore operations.
pub trait DbRecorder: Send + Sync {
    /// Starts a measurement. Callable before the outcome dimensions are
    /// known; never fails.
    fn begin(&self, labels: &DbLabels<'_>) -> Span;

    /// Completes a measurement. `outcome` is `None` on success; a failure
    /// contributes its primary classification code as the `error_code`
    /// label.
    fn complete(&self, outcome: Option<&dyn ClassifiedError>, labels: &DbLabels<'_>, span: Span);

    /// Underlying counter, `None` on the no-op recorder.
    fn operations_total(&self) -> Option<&CounterVec>;

    /// Underlying latency histogram, `None` on the no-op recorder.
    fn operations_latency_millis(&self) -> Option<&HistogramVec>;
}

/// Prometheus-backed datastore recorder.
pub struct DbMetrics {
    operations_total: CounterVec,
    operations_latency_millis: HistogramVec,
}

impl DbMetrics {
    /// Registers the datastore metrics against `registry`. Construct once
    /// per registry at wiring time; a second construction panics because
    /// the metric names are already taken.
    pub fn new(registry: &Registry, opts: &BackendOpts) -> Self {
        let operations_total = register_counter_vec_with_registry!(
            opts.opts("db_operations_total", "Total datastore operations"),
            &OPERATION_LABELS,
            registry
        )
        .expect("Failed to register db_operations_total");

        let operations_latency_millis = register_histogram_vec_with_registry!(
            opts.latency_opts(
                "db_operations_latency_millis",
                "Datastore operation latency in milliseconds"
            ),
            &LATENCY_LABELS,
            registry
        )
        .expect("Failed to register db_operations_latency_millis");

        DbMetrics {
            operations_total,
            operations_latency_millis,
        }
    }
}

impl DbRecorder for DbMetrics {
    fn begin(&self, _labels: &DbLabels<'_>) -> Span {
        Span::now()
    }

    fn complete(&self, outcome: Option<&dyn ClassifiedError>, labels: &DbLabels<'_>, span: Span) {
        let status = match outcome {
            None => STATUS_SUCCESS,
            Some(_) => STATUS_FAILURE,
        };
        let error_code = outcome.map_or(LABEL_NONE, |err| err.primary_code());

        backend::inc_counter(
            &self.operations_total,
            &labels.operation_values(status, error_code),
        );
        backend::observe(
            &self.operations_latency_millis,
            &labels.latency_values(status),
            span.elapsed_millis(),
        );
    }

    fn operations_total(&self) -> Option<&CounterVec> {
        Some(&self.operations_total)
    }

    fn operations_latency_millis(&self) -> Option<&HistogramVec> {
        Some(&self.operations_latency_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct NotFound;

    impl fmt::Display for NotFound {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "document not found")
        }
    }

    impl std::error::Error for NotFound {}

    impl ClassifiedError for NotFound {
        fn error_codes(&self) -> Vec<&str> {
            vec!["E_NOT_FOUND"]
        }
    }

    #[test]
    fn success_and_failure_land_on_separate_series() {
        let registry = Registry::new();
        let metrics = DbMetrics::new(&registry, &BackendOpts::default());
        let labels = DbLabels::new("read");

        let span = metrics.begin(&labels);
        metrics.complete(None, &labels, span);

        let span = metrics.begin(&labels);
        metrics.complete(Some(&NotFound), &labels, span);

        let counter = metrics.operations_total().unwrap();
        assert_eq!(
            counter
                .with_label_values(&["read", "success", "none"])
                .get(),
            1.0
        );
        assert_eq!(
            counter
                .with_label_values(&["read", "failure", "E_NOT_FOUND"])
                .get(),
            1.0
        );

        let latency = metrics.operations_latency_millis().unwrap();
        assert_eq!(
            latency
                .with_label_values(&["read", "success"])
                .get_sample_count(),
            1
        );
        assert_eq!(
            latency
                .with_label_values(&["read", "failure"])
                .get_sample_count(),
            1
        );
    }

    #[test]
    fn completion_without_begin_records_zero_latency() {
        let registry = Registry::new();
        let metrics = DbMetrics::new(&registry, &BackendOpts::default());
        let labels = DbLabels::new("write");

        metrics.complete(None, &labels, Span::default());

        let latency = metrics.operations_latency_millis().unwrap();
        let histogram = latency.with_label_values(&["write", "success"]);
        assert_eq!(histogram.get_sample_count(), 1);
        assert_eq!(histogram.get_sample_sum(), 0.0);
    }

    #[test]
    #[should_panic(expected = "Failed to register db_operations_total")]
    fn double_construction_against_one_registry_panics() {
        let registry = Registry::new();
        let _first = DbMetrics::new(&registry, &BackendOpts::default());
        let _second = DbMetrics::new(&registry, &BackendOpts::default());
    }
}
