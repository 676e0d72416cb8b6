//! Outbound call metrics: counts, latency and payload sizes per downstream
//! service and operation.

use prometheus::{
    register_counter_vec_with_registry, register_histogram_vec_with_registry, CounterVec,
    HistogramVec, Registry,
};

use super::base::{status_class, Span, STATUS_FAILURE, STATUS_SUCCESS};
use crate::backend::{self, BackendOpts};
use crate::models::HttpExchange;

const REQUEST_LABELS: [&str; 4] = ["service", "operation", "status", "status_class"];
const LATENCY_LABELS: [&str; 3] = ["service", "operation", "status"];
const SIZE_LABELS: [&str; 2] = ["service", "operation"];

/// Dimension values for one outbound call.
#[derive(Debug, Clone, Copy)]
pub struct DownstreamLabels<'a> {
    /// Downstream service name, e.g. "billing".
    pub service: &'a str,
    /// Logical operation on that service, e.g. "charge".
    pub operation: &'a str,
}

impl<'a> DownstreamLabels<'a> {
    pub fn new(service: &'a str, operation: &'a str) -> Self {
        DownstreamLabels { service, operation }
    }

    fn request_values<'v>(&self, status: &'v str, class: &'v str) -> [&'v str; 4]
    where
        'a: 'v,
    {
        [self.service, self.operation, status, class]
    }

    fn latency_values<'v>(&self, status: &'v str) -> [&'v str; 3]
    where
        'a: 'v,
    {
        [self.service, self.operation, status]
    }

    fn size_values(&self) -> [&'a str; 2] {
        [self.service, self.operation]
    }
}

/// Records outbound calls to downstream services.
pub trait DownstreamRecorder: Send + Sync {
    /// Starts a measurement before the call leaves the process; never fails.
    fn begin(&self, labels: &DownstreamLabels<'_>) -> Span;

    /// Completes a measurement. `success` is the caller's verdict;
    /// `exchange` carries the wire-level status and sizes (status 0 when no
    /// response arrived).
    fn complete(
        &self,
        success: bool,
        exchange: &HttpExchange,
        labels: &DownstreamLabels<'_>,
        span: Span,
    );

    /// Underlying counter, `None` on the no-op recorder.
    fn http_requests_total(&self) -> Option<&CounterVec>;

    /// Underlying latency histogram, `None` on the no-op recorder.
    fn http_requests_latency_millis(&self) -> Option<&HistogramVec>;

    /// Underlying request-size histogram, `None` on the no-op recorder.
    fn http_request_size_bytes(&self) -> Option<&HistogramVec>;

    /// Underlying response-size histogram, `None` on the no-op recorder.
    fn http_response_size_bytes(&self) -> Option<&HistogramVec>;
}

/// Prometheus-backed outbound call recorder.
pub struct DownstreamMetrics {
    requests_total: CounterVec,
    requests_latency_millis: HistogramVec,
    request_size_bytes: HistogramVec,
    response_size_bytes: HistogramVec,
}

impl DownstreamMetrics {
    /// Registers the outbound call metrics against `registry`. Construct
    /// once per registry at wiring time.
    pub fn new(registry: &Registry, opts: &BackendOpts) -> Self {
        let requests_total = register_counter_vec_with_registry!(
            opts.opts(
                "downstream_http_requests_total",
                "Total outbound requests to downstream services"
            ),
            &REQUEST_LABELS,
            registry
        )
        .expect("Failed to register downstream_http_requests_total");

        let requests_latency_millis = register_histogram_vec_with_registry!(
            opts.latency_opts(
                "downstream_http_requests_latency_millis",
                "Outbound request latency in milliseconds"
            ),
            &LATENCY_LABELS,
            registry
        )
        .expect("Failed to register downstream_http_requests_latency_millis");

        let request_size_bytes = register_histogram_vec_with_registry!(
            opts.size_opts(
                "downstream_http_request_size_bytes",
                "Outbound request payload size in bytes"
            ),
            &SIZE_LABELS,
            registry
        )
        .expect("Failed to register downstream_http_request_size_bytes");

        let response_size_bytes = register_histogram_vec_with_registry!(
            opts.size_opts(
                "downstream_http_response_size_bytes",
                "Downstream response payload size in bytes"
            ),
            &SIZE_LABELS,
            registry
        )
        .expect("Failed to register downstream_http_response_size_bytes");

        DownstreamMetrics {
            requests_total,
            requests_latency_millis,
            request_size_bytes,
            response_size_bytes,
        }
    }
}

impl DownstreamRecorder for DownstreamMetrics {
    fn begin(&self, _labels: &DownstreamLabels<'_>) -> Span {
        Span::now()
    }

    fn complete(
        &self,
        success: bool,
        exchange: &HttpExchange,
        labels: &DownstreamLabels<'_>,
        span: Span,
    ) {
        let status = if success { STATUS_SUCCESS } else { STATUS_FAILURE };
        let class = status_class(exchange.status);

        backend::inc_counter(&self.requests_total, &labels.request_values(status, class));
        backend::observe(
            &self.requests_latency_millis,
            &labels.latency_values(status),
            span.elapsed_millis(),
        );
        backend::observe(
            &self.request_size_bytes,
            &labels.size_values(),
            exchange.request_bytes.unwrap_or(0) as f64,
        );
        backend::observe(
            &self.response_size_bytes,
            &labels.size_values(),
            exchange.response_bytes.unwrap_or(0) as f64,
        );
    }

    fn http_requests_total(&self) -> Option<&CounterVec> {
        Some(&self.requests_total)
    }

    fn http_requests_latency_millis(&self) -> Option<&HistogramVec> {
        Some(&self.requests_latency_millis)
    }

    fn http_request_size_bytes(&self) -> Option<&HistogramVec> {
        Some(&self.request_size_bytes)
    }

    fn http_response_size_bytes(&self) -> Option<&HistogramVec> {
        Some(&self.response_size_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_call_without_response_gets_class_none() {
        let registry = Registry::new();
        let metrics = DownstreamMetrics::new(&registry, &BackendOpts::default());
        let labels = DownstreamLabels::new("billing", "charge");

        let span = metrics.begin(&labels);
        // Connection refused: no response, no sizes.
        metrics.complete(false, &HttpExchange::default(), &labels, span);

        let counter = metrics.http_requests_total().unwrap();
        assert_eq!(
            counter
                .with_label_values(&["billing", "charge", "failure", "none"])
                .get(),
            1.0
        );
    }

    #[test]
    fn successful_call_records_sizes_and_class() {
        let registry = Registry::new();
        let metrics = DownstreamMetrics::new(&registry, &BackendOpts::default());
        let labels = DownstreamLabels::new("billing", "charge");

        let exchange = HttpExchange {
            status: 201,
            request_bytes: Some(512),
            response_bytes: Some(2048),
        };
        let span = metrics.begin(&labels);
        metrics.complete(true, &exchange, &labels, span);

        let counter = metrics.http_requests_total().unwrap();
        assert_eq!(
            counter
                .with_label_values(&["billing", "charge", "success", "2xx"])
                .get(),
            1.0
        );

        let request_sizes = metrics.http_request_size_bytes().unwrap();
        let sample = request_sizes.with_label_values(&["billing", "charge"]);
        assert_eq!(sample.get_sample_count(), 1);
        assert_eq!(sample.get_sample_sum(), 512.0);

        let response_sizes = metrics.http_response_size_bytes().unwrap();
        let sample = response_sizes.with_label_values(&["billing", "charge"]);
        assert_eq!(sample.get_sample_count(), 1);
        assert_eq!(sample.get_sample_sum(), 2048.0);
    }
}
