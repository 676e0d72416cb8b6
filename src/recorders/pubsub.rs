//! Messaging metrics: publish and consume counts per topic, publish latency
//! and payload sizes.

use prometheus::{
    register_counter_vec_with_registry, register_histogram_vec_with_registry, CounterVec,
    HistogramVec, Registry,
};

use super::base::{Span, LABEL_NONE, STATUS_FAILURE, STATUS_SUCCESS};
use crate::backend::{self, BackendOpts};
use crate::models::{EventTxn, MessageKind};

const PUBLISHED_LABELS: [&str; 2] = ["topic", "status"];
const CONSUMED_LABELS: [&str; 4] = ["topic", "group", "partition", "status"];
const TOPIC_LABELS: [&str; 1] = ["topic"];

/// Dimension values for one messaging operation.
#[derive(Debug, Clone, Copy)]
pub struct PubSubLabels<'a> {
    pub topic: &'a str,
    /// Consumer group; ignored for publishes.
    pub group: &'a str,
}

impl<'a> PubSubLabels<'a> {
    pub fn new(topic: &'a str, group: &'a str) -> Self {
        PubSubLabels { topic, group }
    }

    fn published_values<'v>(&self, status: &'v str) -> [&'v str; 2]
    where
        'a: 'v,
    {
        [self.topic, status]
    }

    fn consumed_values<'v>(&self, partition: &'v str, status: &'v str) -> [&'v str; 4]
    where
        'a: 'v,
    {
        [self.topic, self.group, partition, status]
    }

    fn topic_values(&self) -> [&'a str; 1] {
        [self.topic]
    }
}

/// Records messaging operations. Publish latency and payload size get their
/// own histograms; consumes contribute to the consumed counter only.
pub trait PubSubRecorder: Send + Sync {
    /// Starts a measurement; never fails.
    fn begin(&self, labels: &PubSubLabels<'_>) -> Span;

    /// Completes a measurement using the transaction descriptor the
    /// transport produced.
    fn complete(&self, txn: &EventTxn, labels: &PubSubLabels<'_>, span: Span);

    /// Underlying publish counter, `None` on the no-op recorder.
    fn messages_published_total(&self) -> Option<&CounterVec>;

    /// Underlying consume counter, `None` on the no-op recorder.
    fn messages_consumed_total(&self) -> Option<&CounterVec>;

    /// Underlying publish latency histogram, `None` on the no-op recorder.
    fn published_latency_millis(&self) -> Option<&HistogramVec>;

    /// Underlying publish size histogram, `None` on the no-op recorder.
    fn published_size_bytes(&self) -> Option<&HistogramVec>;
}

/// Prometheus-backed messaging recorder.
pub struct PubSubMetrics {
    messages_published_total: CounterVec,
    messages_consumed_total: CounterVec,
    published_latency_millis: HistogramVec,
    published_size_bytes: HistogramVec,
}

impl PubSubMetrics {
    /// Registers the messaging metrics against `registry`. Construct once
    /// per registry at wiring time.
    pub fn new(registry: &Registry, opts: &BackendOpts) -> Self {
        let messages_published_total = register_counter_vec_with_registry!(
            opts.opts(
                "pubsub_messages_published_total",
                "Total messages published"
            ),
            &PUBLISHED_LABELS,
            registry
        )
        .expect("Failed to register pubsub_messages_published_total");

        let messages_consumed_total = register_counter_vec_with_registry!(
            opts.opts("pubsub_messages_consumed_total", "Total messages consumed"),
            &CONSUMED_LABELS,
            registry
        )
        .expect("Failed to register pubsub_messages_consumed_total");

        let published_latency_millis = register_histogram_vec_with_registry!(
            opts.latency_opts(
                "pubsub_messages_published_latency_millis",
                "Publish latency in milliseconds"
            ),
            &TOPIC_LABELS,
            registry
        )
        .expect("Failed to register pubsub_messages_published_latency_millis");

        let published_size_bytes = register_histogram_vec_with_registry!(
            opts.size_opts(
                "pubsub_messages_published_size_bytes",
                "Published message payload size in bytes"
            ),
            &TOPIC_LABELS,
            registry
        )
        .expect("Failed to register pubsub_messages_published_size_bytes");

        PubSubMetrics {
            messages_published_total,
            messages_consumed_total,
            published_latency_millis,
            published_size_bytes,
        }
    }
}

impl PubSubRecorder for PubSubMetrics {
    fn begin(&self, _labels: &PubSubLabels<'_>) -> Span {
        Span::now()
    }

    fn complete(&self, txn: &EventTxn, labels: &PubSubLabels<'_>, span: Span) {
        let status = if txn.success {
            STATUS_SUCCESS
        } else {
            STATUS_FAILURE
        };

        match txn.kind {
            MessageKind::Published => {
                backend::inc_counter(
                    &self.messages_published_total,
                    &labels.published_values(status),
                );
                backend::observe(
                    &self.published_latency_millis,
                    &labels.topic_values(),
                    span.elapsed_millis(),
                );
                if let Some(bytes) = txn.payload_bytes {
                    backend::observe(
                        &self.published_size_bytes,
                        &labels.topic_values(),
                        bytes as f64,
                    );
                }
            }
            MessageKind::Consumed => {
                let partition = txn.partition.map(|p| p.to_string());
                let partition = partition.as_deref().unwrap_or(LABEL_NONE);
                backend::inc_counter(
                    &self.messages_consumed_total,
                    &labels.consumed_values(partition, status),
                );
            }
        }
    }

    fn messages_published_total(&self) -> Option<&CounterVec> {
        Some(&self.messages_published_total)
    }

    fn messages_consumed_total(&self) -> Option<&CounterVec> {
        Some(&self.messages_consumed_total)
    }

    fn published_latency_millis(&self) -> Option<&HistogramVec> {
        Some(&self.published_latency_millis)
    }

    fn published_size_bytes(&self) -> Option<&HistogramVec> {
        Some(&self.published_size_bytes)
    }
}
