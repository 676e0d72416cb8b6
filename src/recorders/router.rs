//! Inbound request metrics and the axum middleware that drives them.
//!
//! Unlike the other families, begin and complete collapse into a single
//! middleware unit spanning the request: [`track_requests`], installed with
//! `axum::middleware::from_fn_with_state` and a [`RouterMetricsState`].

use std::sync::Arc;

use axum::extract::{MatchedPath, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use http::HeaderMap;
use prometheus::{
    register_counter_vec_with_registry, register_histogram_vec_with_registry, CounterVec,
    HistogramVec, Registry,
};

use super::base::{status_class, Span};
use crate::backend::{self, BackendOpts};
use crate::models::HttpExchange;

const REQUEST_LABELS: [&str; 3] = ["method", "route", "status_class"];
const SIZE_LABELS: [&str; 2] = ["method", "route"];

/// Route label recorded when no route template matched, so arbitrary
/// request paths never become label values.
pub const ROUTE_UNMATCHED: &str = "unrouted";

/// Dimension values for one inbound request.
#[derive(Debug, Clone, Copy)]
pub struct RouterLabels<'a> {
    pub method: &'a str,
    /// Matched route template, e.g. "/users/:id".
    pub route: &'a str,
}

impl<'a> RouterLabels<'a> {
    pub fn new(method: &'a str, route: &'a str) -> Self {
        RouterLabels { method, route }
    }

    fn request_values<'v>(&self, class: &'v str) -> [&'v str; 3]
    where
        'a: 'v,
    {
        [self.method, self.route, class]
    }

    fn size_values(&self) -> [&'a str; 2] {
        [self.method, self.route]
    }
}

/// Records completed inbound request exchanges.
pub trait RouterRecorder: Send + Sync {
    /// Records one completed exchange. [`track_requests`] calls this once
    /// per request; custom dispatchers can call it directly with a span
    /// from [`Span::now`].
    fn record(&self, exchange: &HttpExchange, labels: &RouterLabels<'_>, span: Span);

    /// Underlying counter, `None` on the no-op recorder.
    fn http_requests_total(&self) -> Option<&CounterVec>;

    /// Underlying latency histogram, `None` on the no-op recorder.
    fn http_requests_latency_millis(&self) -> Option<&HistogramVec>;

    /// Underlying request-size histogram, `None` on the no-op recorder.
    fn http_request_size_bytes(&self) -> Option<&HistogramVec>;

    /// Underlying response-size histogram, `None` on the no-op recorder.
    fn http_response_size_bytes(&self) -> Option<&HistogramVec>;
}

/// Prometheus-backed inbound request recorder.
pub struct RouterMetrics {
    requests_total: CounterVec,
    requests_latency_millis: HistogramVec,
    request_size_bytes: HistogramVec,
    response_size_bytes: HistogramVec,
}

impl RouterMetrics {
    /// Registers the inbound request metrics against `registry`. Construct
    /// once per registry at wiring time.
    pub fn new(registry: &Registry, opts: &BackendOpts) -> Self {
        let requests_total = register_counter_vec_with_registry!(
            opts.opts("http_requests_total", "Total inbound HTTP requests"),
            &REQUEST_LABELS,
            registry
        )
        .expect("Failed to register http_requests_total");

        let requests_latency_millis = register_histogram_vec_with_registry!(
            opts.latency_opts(
                "http_requests_latency_millis",
                "Inbound request latency in milliseconds"
            ),
            &REQUEST_LABELS,
            registry
        )
        .expect("Failed to register http_requests_latency_millis");

        let request_size_bytes = register_histogram_vec_with_registry!(
            opts.size_opts(
                "http_request_size_bytes",
                "Inbound request body size in bytes"
            ),
            &SIZE_LABELS,
            registry
        )
        .expect("Failed to register http_request_size_bytes");

        let response_size_bytes = register_histogram_vec_with_registry!(
            opts.size_opts(
                "http_response_size_bytes",
                "Inbound response body size in bytes"
            ),
            &SIZE_LABELS,
            registry
        )
        .expect("Failed to register http_response_size_bytes");

        RouterMetrics {
            requests_total,
            requests_latency_millis,
            request_size_bytes,
            response_size_bytes,
        }
    }
}

impl RouterRecorder for RouterMetrics {
    fn record(&self, exchange: &HttpExchange, labels: &RouterLabels<'_>, span: Span) {
        let class = status_class(exchange.status);

        backend::inc_counter(&self.requests_total, &labels.request_values(class));
        backend::observe(
            &self.requests_latency_millis,
            &labels.request_values(class),
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

/// State for [`track_requests`]: which recorder to drive and the exposition
/// path to leave unrecorded.
#[derive(Clone)]
pub struct RouterMetricsState {
    recorder: Arc<dyn RouterRecorder>,
    metrics_path: String,
}

impl RouterMetricsState {
    pub fn new(recorder: Arc<dyn RouterRecorder>, metrics_path: impl Into<String>) -> Self {
        RouterMetricsState {
            recorder,
            metrics_path: metrics_path.into(),
        }
    }
}

/// Axum middleware recording every request passing through it.
///
/// The route label is the matched route template when axum provides one,
/// [`ROUTE_UNMATCHED`] otherwise. Requests for the configured metrics path
/// pass through unrecorded so the scrape endpoint does not observe itself.
/// Sizes come from `Content-Length` and read as 0 for streamed bodies.
///
/// Completion runs exactly once per request, after the inner handler
/// returns. Panics are not caught here; hosts wanting recovered panics
/// recorded as 500s place their catch-panic layer inside this one.
pub async fn track_requests(
    State(state): State<RouterMetricsState>,
    request: Request,
    next: Next,
) -> Response {
    if request.uri().path() == state.metrics_path {
        return next.run(request).await;
    }

    let span = Span::now();
    let method = request.method().as_str().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string())
        .unwrap_or_else(|| ROUTE_UNMATCHED.to_string());
    let request_bytes = content_length(request.headers());

    let response = next.run(request).await;

    let exchange = HttpExchange {
        status: response.status().as_u16(),
        request_bytes,
        response_bytes: content_length(response.headers()),
    };
    state
        .recorder
        .record(&exchange, &RouterLabels::new(&method, &route), span);

    response
}

fn content_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(http::header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .parse()
        .ok()
}
