//! Scheduled job metrics: per-job execution counts and runtimes.

use prometheus::{
    register_counter_vec_with_registry, register_histogram_vec_with_registry, CounterVec,
    HistogramVec, Registry,
};

use super::base::{Span, LABEL_NONE, STATUS_FAILURE, STATUS_SUCCESS};
use crate::backend::{self, BackendOpts};
use crate::models::ClassifiedError;

const EXECUTION_LABELS: [&str; 3] = ["job", "status", "error_code"];
const LATENCY_LABELS: [&str; 2] = ["job", "status"];

/// Dimension values for one scheduled job run.
#[derive(Debug, Clone, Copy)]
pub struct CronJobLabels<'a> {
    /// Job name, e.g. "session_cleanup".
    pub job: &'a str,
}

impl<'a> CronJobLabels<'a> {
    pub fn new(job: &'a str) -> Self {
        CronJobLabels { job }
    }

    fn execution_values<'v>(&self, status: &'v str, error_code: &'v str) -> [&'v str; 3]
    where
        'a: 'v,
    {
        [self.job, status, error_code]
    }

    fn latency_values<'v>(&self, status: &'v str) -> [&'v str; 2]
    where
        'a: 'v,
    {
        [self.job, status]
    }
}

/// Records scheduled job executions.
pub trait CronJobRecorder: Send + Sync {
    /// Starts a measurement at job start; never fails.
    fn begin(&self, labels: &CronJobLabels<'_>) -> Span;

    /// Completes a measurement. `outcome` is `None` when the run succeeded.
    fn complete(
        &self,
        outcome: Option<&dyn ClassifiedError>,
        labels: &CronJobLabels<'_>,
        span: Span,
    );

    /// Underlying counter, `None` on the no-op recorder.
    fn executions_total(&self) -> Option<&CounterVec>;

    /// Underlying runtime histogram, `None` on the no-op recorder.
    fn execution_latency_millis(&self) -> Option<&HistogramVec>;
}

/// Prometheus-backed scheduled job recorder.
pub struct CronJobMetrics {
    executions_total: CounterVec,
    execution_latency_millis: HistogramVec,
}

impl CronJobMetrics {
    /// Registers the job metrics against `registry`. Construct once per
    /// registry at wiring time.
    pub fn new(registry: &Registry, opts: &BackendOpts) -> Self {
        let executions_total = register_counter_vec_with_registry!(
            opts.opts("cron_job_executions_total", "Total scheduled job runs"),
            &EXECUTION_LABELS,
            registry
        )
        .expect("Failed to register cron_job_executions_total");

        let execution_latency_millis = register_histogram_vec_with_registry!(
            opts.latency_opts(
                "cron_job_execution_latency_millis",
                "Scheduled job runtime in milliseconds"
            ),
            &LATENCY_LABELS,
            registry
        )
        .expect("Failed to register cron_job_execution_latency_millis");

        CronJobMetrics {
            executions_total,
            execution_latency_millis,
        }
    }
}

impl CronJobRecorder for CronJobMetrics {
    fn begin(&self, _labels: &CronJobLabels<'_>) -> Span {
        Span::now()
    }

    fn complete(
        &self,
        outcome: Option<&dyn ClassifiedError>,
        labels: &CronJobLabels<'_>,
        span: Span,
    ) {
        let status = match outcome {
            None => STATUS_SUCCESS,
            Some(_) => STATUS_FAILURE,
        };
        let error_code = outcome.map_or(LABEL_NONE, |err| err.primary_code());

        backend::inc_counter(
            &self.executions_total,
            &labels.execution_values(status, error_code),
        );
        backend::observe(
            &self.execution_latency_millis,
            &labels.latency_values(status),
            span.elapsed_millis(),
        );
    }

    fn executions_total(&self) -> Option<&CounterVec> {
        Some(&self.executions_total)
    }

    fn execution_latency_millis(&self) -> Option<&HistogramVec> {
        Some(&self.execution_latency_millis)
    }
}
