//! Live gauge of outstanding application error conditions per
//! classification code.
//!
//! The authoritative per-code counts live in the tracker's own map; the
//! Prometheus gauge only mirrors them via `set`. The zero floor has to be
//! enforced on the map because the backend gauge happily goes negative.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use prometheus::{register_gauge_vec_with_registry, GaugeVec, Registry};
use tracing::debug;

use crate::backend::{self, BackendOpts};
use crate::models::ClassifiedError;
use crate::utils::log_throttle;

const ERROR_LABELS: [&str; 1] = ["code"];

/// Tracks application error conditions as a live gauge: record on
/// occurrence, resolve when the condition clears.
pub trait AppErrorRecorder: Send + Sync {
    /// Marks one more occurrence of each given code as active. Callers pair
    /// every `record` with an eventual [`resolve`](Self::resolve) per code;
    /// an unpaired record leaves the gauge inflated.
    fn record(&self, error_codes: &[&str]);

    /// Marks every code carried by `error` as active.
    fn record_classified(&self, error: &dyn ClassifiedError) {
        self.record(&error.error_codes());
    }

    /// Marks one occurrence of `error_code` as resolved. The active count
    /// never drops below zero; resolving an uncounted code is a no-op.
    fn resolve(&self, error_code: &str);

    /// Underlying gauge, `None` on the no-op recorder.
    fn active_errors(&self) -> Option<&GaugeVec>;
}

/// Prometheus-backed error tracker.
pub struct AppErrorMetrics {
    active_errors: GaugeVec,
    counts: Mutex<HashMap<String, u64>>,
}

impl AppErrorMetrics {
    /// Registers the error gauge against `registry`. Construct once per
    /// registry at wiring time.
    pub fn new(registry: &Registry, opts: &BackendOpts) -> Self {
        let active_errors = register_gauge_vec_with_registry!(
            opts.opts(
                "application_active_errors",
                "Currently active application errors per classification code"
            ),
            &ERROR_LABELS,
            registry
        )
        .expect("Failed to register application_active_errors");

        AppErrorMetrics {
            active_errors,
            counts: Mutex::new(HashMap::new()),
        }
    }

    fn lock_counts(&self) -> MutexGuard<'_, HashMap<String, u64>> {
        // A poisoned lock still holds a structurally valid map.
        self.counts.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl AppErrorRecorder for AppErrorMetrics {
    fn record(&self, error_codes: &[&str]) {
        let mut counts = self.lock_counts();
        for &code in error_codes {
            let count = counts
                .entry(code.to_string())
                .and_modify(|count| *count += 1)
                .or_insert(1);
            backend::set_gauge(&self.active_errors, &[code], *count as f64);
        }
    }

    fn resolve(&self, error_code: &str) {
        let mut counts = self.lock_counts();
        match counts.get_mut(error_code) {
            Some(count) if *count > 0 => {
                *count -= 1;
                backend::set_gauge(&self.active_errors, &[error_code], *count as f64);
            }
            _ => {
                if let Some(suppressed) = log_throttle::should_emit(
                    "application_active_errors.unmatched_resolve",
                    log_throttle::DEFAULT_WINDOW,
                ) {
                    debug!(
                        "Resolve for '{}' without a matching record ({} suppressed since last report)",
                        error_code, suppressed
                    );
                }
            }
        }
    }

    fn active_errors(&self) -> Option<&GaugeVec> {
        Some(&self.active_errors)
    }
}
