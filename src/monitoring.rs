//! Wiring facade: one recorder handle per instrumented surface.
//!
//! Hosts build a [`Monitoring`] once at startup and clone it wherever
//! measurements happen. Real vs no-op is decided here, once; instrumented
//! code never branches on whether telemetry is enabled.

use std::sync::Arc;

use prometheus::Registry;

use crate::backend::BackendOpts;
use crate::config::MonitoringConfig;
use crate::recorders::noop::{
    NoopAppErrorMetrics, NoopCronJobMetrics, NoopDbMetrics, NoopDownstreamMetrics,
    NoopPubSubMetrics, NoopRouterMetrics,
};
use crate::recorders::{
    AppErrorMetrics, AppErrorRecorder, CronJobMetrics, CronJobRecorder, DbMetrics, DbRecorder,
    DownstreamMetrics, DownstreamRecorder, PubSubMetrics, PubSubRecorder, RouterMetrics,
    RouterRecorder,
};

/// The recorder set shared across an application.
///
/// Cloning is cheap; all recorders are behind `Arc` and share their backend
/// handles with every clone.
#[derive(Clone)]
pub struct Monitoring {
    /// Inbound request recorder, driven by the router middleware.
    pub router: Arc<dyn RouterRecorder>,
    /// Outbound call recorder.
    pub downstream: Arc<dyn DownstreamRecorder>,
    /// Datastore operation recorder.
    pub db: Arc<dyn DbRecorder>,
    /// Scheduled job recorder.
    pub cron: Arc<dyn CronJobRecorder>,
    /// Messaging operation recorder.
    pub pubsub: Arc<dyn PubSubRecorder>,
    /// Application error gauge tracker.
    pub app_errors: Arc<dyn AppErrorRecorder>,
    registry: Option<Arc<Registry>>,
}

impl Monitoring {
    /// Builds the recorder set from `config`: Prometheus-backed recorders
    /// registered against a fresh registry when monitoring is enabled, the
    /// no-op set otherwise. Call once at process wiring time.
    pub fn from_config(config: &MonitoringConfig) -> Self {
        if !config.enabled {
            return Self::disabled();
        }
        Self::with_registry(Arc::new(Registry::new()), &BackendOpts::from_config(config))
    }

    /// Builds Prometheus-backed recorders against a caller-supplied
    /// registry, for hosts that aggregate several metric sources into one
    /// exposition endpoint. Panics if the metric names are already
    /// registered there, so call once per registry.
    pub fn with_registry(registry: Arc<Registry>, opts: &BackendOpts) -> Self {
        Monitoring {
            router: Arc::new(RouterMetrics::new(&registry, opts)),
            downstream: Arc::new(DownstreamMetrics::new(&registry, opts)),
            db: Arc::new(DbMetrics::new(&registry, opts)),
            cron: Arc::new(CronJobMetrics::new(&registry, opts)),
            pubsub: Arc::new(PubSubMetrics::new(&registry, opts)),
            app_errors: Arc::new(AppErrorMetrics::new(&registry, opts)),
            registry: Some(registry),
        }
    }

    /// The all-noop recorder set: valid spans, no backend calls, no
    /// registry. The default test double.
    pub fn disabled() -> Self {
        Monitoring {
            router: Arc::new(NoopRouterMetrics::new()),
            downstream: Arc::new(NoopDownstreamMetrics::new()),
            db: Arc::new(NoopDbMetrics::new()),
            cron: Arc::new(NoopCronJobMetrics::new()),
            pubsub: Arc::new(NoopPubSubMetrics::new()),
            app_errors: Arc::new(NoopAppErrorMetrics::new()),
            registry: None,
        }
    }

    /// The registry all recorders registered against, `None` when
    /// monitoring is disabled. Hosts gather from it for their own
    /// exposition endpoint.
    pub fn registry(&self) -> Option<&Arc<Registry>> {
        self.registry.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enabled_config_yields_registered_recorders() {
        let monitoring = Monitoring::from_config(&MonitoringConfig::default());

        assert!(monitoring.registry().is_some());
        assert!(monitoring.db.operations_total().is_some());
        assert!(monitoring.router.http_requests_total().is_some());
        assert!(monitoring.app_errors.active_errors().is_some());
    }

    #[test]
    fn disabled_config_yields_the_noop_set() {
        let config = MonitoringConfig {
            enabled: false,
            ..Default::default()
        };
        let monitoring = Monitoring::from_config(&config);

        assert!(monitoring.registry().is_none());
        assert!(monitoring.db.operations_total().is_none());
        assert!(monitoring.router.http_requests_total().is_none());
        assert!(monitoring.app_errors.active_errors().is_none());
    }

    #[test]
    fn clones_share_backend_handles() {
        let monitoring = Monitoring::from_config(&MonitoringConfig::default());
        let clone = monitoring.clone();

        monitoring.app_errors.record(&["E_SHARED"]);

        let gauge = clone.app_errors.active_errors().unwrap();
        assert_eq!(gauge.with_label_values(&["E_SHARED"]).get(), 1.0);
    }

    #[test]
    fn all_metric_families_land_in_the_registry() {
        let monitoring = Monitoring::from_config(&MonitoringConfig::default());

        // Touch one series per family so gather() reports them.
        monitoring.app_errors.record(&["E_PROBE"]);
        let families = monitoring.registry().unwrap().gather();
        let names: Vec<&str> = families.iter().map(|f| f.get_name()).collect();
        assert!(names.contains(&"application_active_errors"));
    }
}
