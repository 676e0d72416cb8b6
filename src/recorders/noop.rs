//! No-op recorders, selected when monitoring is disabled so instrumented
//! code paths stay identical. Begin hooks still return a live span, letting
//! callers keep their own elapsed-time logging; everything else does
//! nothing and handle accessors return `None`.

use prometheus::{CounterVec, GaugeVec, HistogramVec};

use super::app_errors::AppErrorRecorder;
use super::base::Span;
use super::cron::{CronJobLabels, CronJobRecorder};
use super::db::{DbLabels, DbRecorder};
use super::downstream::{DownstreamLabels, DownstreamRecorder};
use super::pubsub::{PubSubLabels, PubSubRecorder};
use super::router::{RouterLabels, RouterRecorder};
use crate::models::{ClassifiedError, EventTxn, HttpExchange};

/// No-op inbound request recorder.
pub struct NoopRouterMetrics;

impl NoopRouterMetrics {
    pub fn new() -> Self {
        NoopRouterMetrics
    }
}

impl Default for NoopRouterMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl RouterRecorder for NoopRouterMetrics {
    fn record(&self, _exchange: &HttpExchange, _labels: &RouterLabels<'_>, _span: Span) {}

    fn http_requests_total(&self) -> Option<&CounterVec> {
        None
    }

    fn http_requests_latency_millis(&self) -> Option<&HistogramVec> {
        None
    }

    fn http_request_size_bytes(&self) -> Option<&HistogramVec> {
        None
    }

    fn http_response_size_bytes(&self) -> Option<&HistogramVec> {
        None
    }
}

/// No-op outbound call recorder.
pub struct NoopDownstreamMetrics;

impl NoopDownstreamMetrics {
    pub fn new() -> Self {
        NoopDownstreamMetrics
    }
}

impl Default for NoopDownstreamMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl DownstreamRecorder for NoopDownstreamMetrics {
    fn begin(&self, _labels: &DownstreamLabels<'_>) -> Span {
        Span::now()
    }

    fn complete(
        &self,
        _success: bool,
        _exchange: &HttpExchange,
        _labels: &DownstreamLabels<'_>,
        _span: Span,
    ) {
    }

    fn http_requests_total(&self) -> Option<&CounterVec> {
        None
    }

    fn http_requests_latency_millis(&self) -> Option<&HistogramVec> {
        None
    }

    fn http_request_size_bytes(&self) -> Option<&HistogramVec> {
        None
    }

    fn http_response_size_bytes(&self) -> Option<&HistogramVec> {
        None
    }
}

/// No-op datastore recorder.
pub struct NoopDbMetrics;

impl NoopDbMetrics {
    pub fn new() -> Self {
        NoopDbMetrics
    }
}

impl Default for NoopDbMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl DbRecorder for NoopDbMetrics {
    fn begin(&self, _labels: &DbLabels<'_>) -> Span {
        Span::now()
    }

    fn complete(
        &self,
        _outcome: Option<&dyn ClassifiedError>,
        _labels: &DbLabels<'_>,
        _span: Span,
    ) {
    }

    fn operations_total(&self) -> Option<&CounterVec> {
        None
    }

    fn operations_latency_millis(&self) -> Option<&HistogramVec> {
        None
    }
}

/// No-op scheduled job recorder.
pub struct NoopCronJobMetrics;

impl NoopCronJobMetrics {
    pub fn new() -> Self {
        NoopCronJobMetrics
    }
}

impl Default for NoopCronJobMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl CronJobRecorder for NoopCronJobMetrics {
    fn begin(&self, _labels: &CronJobLabels<'_>) -> Span {
        Span::now()
    }

    fn complete(
        &self,
        _outcome: Option<&dyn ClassifiedError>,
        _labels: &CronJobLabels<'_>,
        _span: Span,
    ) {
    }

    fn executions_total(&self) -> Option<&CounterVec> {
        None
    }

    fn execution_latency_millis(&self) -> Option<&HistogramVec> {
        None
    }
}

/// No-op messaging recorder.
pub struct NoopPubSubMetrics;

impl NoopPubSubMetrics {
    pub fn new() -> Self {
        NoopPubSubMetrics
    }
}

impl Default for NoopPubSubMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl PubSubRecorder for NoopPubSubMetrics {
    fn begin(&self, _labels: &PubSubLabels<'_>) -> Span {
        Span::now()
    }

    fn complete(&self, _txn: &EventTxn, _labels: &PubSubLabels<'_>, _span: Span) {}

    fn messages_published_total(&self) -> Option<&CounterVec> {
        None
    }

    fn messages_consumed_total(&self) -> Option<&CounterVec> {
        None
    }

    fn published_latency_millis(&self) -> Option<&HistogramVec> {
        None
    }

    fn published_size_bytes(&self) -> Option<&HistogramVec> {
        None
    }
}

/// No-op error tracker.
pub struct NoopAppErrorMetrics;

impl NoopAppErrorMetrics {
    pub fn new() -> Self {
        NoopAppErrorMetrics
    }
}

impl Default for NoopAppErrorMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl AppErrorRecorder for NoopAppErrorMetrics {
    fn record(&self, _error_codes: &[&str]) {}

    fn resolve(&self, _error_code: &str) {}

    fn active_errors(&self) -> Option<&GaugeVec> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test that no-op begin hooks still hand out usable spans.
    #[test]
    fn noop_begin_returns_a_started_span() {
        assert!(NoopDbMetrics::new().begin(&DbLabels::new("read")).is_started());
        assert!(NoopCronJobMetrics::new()
            .begin(&CronJobLabels::new("job"))
            .is_started());
        assert!(NoopDownstreamMetrics::new()
            .begin(&DownstreamLabels::new("svc", "op"))
            .is_started());
        assert!(NoopPubSubMetrics::new()
            .begin(&PubSubLabels::new("topic", "group"))
            .is_started());
    }

    /// Test that no-op recorders expose no backend handles.
    #[test]
    fn noop_accessors_return_none() {
        assert!(NoopRouterMetrics::new().http_requests_total().is_none());
        assert!(NoopRouterMetrics::new()
            .http_requests_latency_millis()
            .is_none());
        assert!(NoopDownstreamMetrics::new().http_requests_total().is_none());
        assert!(NoopDbMetrics::new().operations_total().is_none());
        assert!(NoopCronJobMetrics::new().executions_total().is_none());
        assert!(NoopPubSubMetrics::new().messages_published_total().is_none());
        assert!(NoopAppErrorMetrics::new().active_errors().is_none());
    }

    /// Test that every no-op operation is callable in any order.
    #[test]
    fn noop_operations_accept_any_order() {
        let db = NoopDbMetrics::new();
        let labels = DbLabels::new("read");
        db.complete(None, &labels, Span::unstarted());
        let span = db.begin(&labels);
        db.complete(None, &labels, span);

        let errors = NoopAppErrorMetrics::new();
        errors.resolve("E_TIMEOUT");
        errors.record(&["E_TIMEOUT"]);
        errors.resolve("E_TIMEOUT");
        errors.resolve("E_TIMEOUT");

        let router = NoopRouterMetrics::new();
        router.record(
            &HttpExchange::with_status(500),
            &RouterLabels::new("GET", "/"),
            Span::unstarted(),
        );

        let pubsub = NoopPubSubMetrics::new();
        pubsub.complete(
            &EventTxn::published(true),
            &PubSubLabels::new("topic", ""),
            Span::unstarted(),
        );
    }
}
