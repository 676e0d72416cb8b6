//! One recorder family per instrumented surface.
//!
//! Each family pairs a capability trait with a Prometheus-backed and a
//! no-op implementation, so hosts select once at wiring time and
//! instrumented code never branches on whether telemetry is on.

pub mod app_errors;
pub mod base;
pub mod cron;
pub mod db;
pub mod downstream;
pub mod noop;
pub mod pubsub;
pub mod router;

// Re-export the recorder surface so code outside can do
// "use monitron::recorders::{DbRecorder, Span};"
pub use app_errors::{AppErrorMetrics, AppErrorRecorder};
pub use base::{status_class, Span, LABEL_NONE, STATUS_FAILURE, STATUS_SUCCESS};
pub use cron::{CronJobLabels, CronJobMetrics, CronJobRecorder};
pub use db::{DbLabels, DbMetrics, DbRecorder};
pub use downstream::{DownstreamLabels, DownstreamMetrics, DownstreamRecorder};
pub use noop::{
    NoopAppErrorMetrics, NoopCronJobMetrics, NoopDbMetrics, NoopDownstreamMetrics,
    NoopPubSubMetrics, NoopRouterMetrics,
};
pub use pubsub::{PubSubLabels, PubSubMetrics, PubSubRecorder};
pub use router::{
    track_requests, RouterLabels, RouterMetrics, RouterMetricsState, RouterRecorder,
    ROUTE_UNMATCHED,
};
