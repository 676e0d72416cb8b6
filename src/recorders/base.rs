//! Shared measurement vocabulary: spans and the label values every family
//! stamps onto its series.

use std::time::{Duration, Instant};

/// Label value for operations that completed without error.
pub const STATUS_SUCCESS: &str = "success";
/// Label value for operations that failed.
pub const STATUS_FAILURE: &str = "failure";
/// Label value when a dimension has nothing to report: no error code, no
/// HTTP status, no partition.
pub const LABEL_NONE: &str = "none";

/// Coarse status-code class used as a label value, `"1xx"` through `"5xx"`.
/// Anything outside the wire range (including 0 for "no response") maps to
/// [`LABEL_NONE`].
pub fn status_class(status: u16) -> &'static str {
    match status {
        100..=199 => "1xx",
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        500..=599 => "5xx",
        _ => LABEL_NONE,
    }
}

/// A started measurement, returned by a recorder's begin hook and handed
/// back at completion.
///
/// Spans are plain values: the caller owns exactly one per operation and the
/// recorder never stores or reuses it. An unstarted span (also `Default`)
/// reads as zero elapsed, so a completion hook called without a matching
/// begin records zero latency instead of failing.
#[derive(Debug, Clone, Copy)]
pub struct Span {
    started_at: Option<Instant>,
}

impl Span {
    /// A span starting now.
    pub fn now() -> Self {
        Span {
            started_at: Some(Instant::now()),
        }
    }

    /// A span with no start time, reading as zero elapsed.
    pub fn unstarted() -> Self {
        Span { started_at: None }
    }

    pub fn is_started(&self) -> bool {
        self.started_at.is_some()
    }

    /// Wall time since the span started. Saturates at zero, so unstarted or
    /// clock-skewed spans never yield a negative measurement.
    pub fn elapsed(&self) -> Duration {
        match self.started_at {
            Some(at) => Instant::now().saturating_duration_since(at),
            None => Duration::ZERO,
        }
    }

    /// Elapsed time in milliseconds, the unit of every latency histogram.
    pub fn elapsed_millis(&self) -> f64 {
        self.elapsed().as_secs_f64() * 1000.0
    }
}

impl Default for Span {
    fn default() -> Self {
        Self::unstarted()
    }
}
