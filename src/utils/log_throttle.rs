//! Windowed suppression for repeated telemetry-degradation logs.
//!
//! A recorder that keeps hitting the same failure must not turn every
//! measurement into a log line. Each degradation kind gets a key; one line
//! may be emitted per window, together with the number of events the window
//! swallowed.

use std::collections::HashMap;
use std::sync::{Mutex, OnceLock, PoisonError};
use std::time::{Duration, Instant};

/// Window used by crate-internal callers.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

#[derive(Debug)]
struct Window {
    opened_at: Instant,
    suppressed: u64,
}

/// Per-key emission windows. Keys identify a degradation kind (usually a
/// metric name), never a per-event value.
#[derive(Debug, Default)]
pub struct LogThrottle {
    windows: Mutex<HashMap<String, Window>>,
}

impl LogThrottle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `Some(suppressed_count)` when a log for `key` should be
    /// emitted, otherwise `None` and the event is counted as suppressed for
    /// the active window.
    pub fn should_emit(&self, key: &str, window: Duration) -> Option<u64> {
        // Poisoning can at worst lose suppression counts; keep throttling.
        let mut windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();

        match windows.get_mut(key) {
            Some(state) => {
                if now.duration_since(state.opened_at) >= window {
                    let suppressed = state.suppressed;
                    state.opened_at = now;
                    state.suppressed = 0;
                    Some(suppressed)
                } else {
                    state.suppressed += 1;
                    None
                }
            }
            None => {
                windows.insert(
                    key.to_string(),
                    Window {
                        opened_at: now,
                        suppressed: 0,
                    },
                );
                Some(0)
            }
        }
    }
}

/// Crate-wide throttle shared by every recorder.
pub fn should_emit(key: &str, window: Duration) -> Option<u64> {
    static SHARED: OnceLock<LogThrottle> = OnceLock::new();
    SHARED.get_or_init(LogThrottle::new).should_emit(key, window)
}

#[cfg(test)]
mod tests {
    use super::LogThrottle;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn emits_then_suppresses_then_emits_with_count() {
        let throttle = LogThrottle::new();
        let key = "emits_then_suppresses_then_emits_with_count";
        let window = Duration::from_millis(20);

        assert_eq!(throttle.should_emit(key, window), Some(0));
        assert_eq!(throttle.should_emit(key, window), None);
        assert_eq!(throttle.should_emit(key, window), None);

        sleep(Duration::from_millis(30));
        assert_eq!(throttle.should_emit(key, window), Some(2));
    }

    #[test]
    fn keys_keep_independent_windows() {
        let throttle = LogThrottle::new();
        let window = Duration::from_secs(60);

        assert_eq!(throttle.should_emit("first", window), Some(0));
        assert_eq!(throttle.should_emit("second", window), Some(0));
        assert_eq!(throttle.should_emit("first", window), None);
    }
}
