//! Client-side rate limiting with sliding reset windows.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::observability::metrics;

/// Default requests allowed per window.
pub const DEFAULT_LIMIT: u32 = 5;
/// Default window length.
pub const DEFAULT_WINDOW: Duration = Duration::from_millis(60_000);

/// A single fixed window for one endpoint key.
struct WindowEntry {
    count: u32,
    reset_at: Instant,
}

/// Outcome of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Allowed,
    /// Denied; the window resets in this many seconds (rounded up).
    Denied { retry_after_secs: u64 },
}

impl Admission {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Admission::Allowed)
    }
}

/// Per-endpoint call counters inside rolling time windows.
///
/// Entries live for the lifetime of the limiter; the key space is bounded
/// by the number of distinct endpoints called, so nothing is evicted.
pub struct RateLimiter {
    entries: Mutex<HashMap<String, WindowEntry>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Decide whether a call to `endpoint` may proceed.
    ///
    /// A missing or expired entry is replaced with `count = 1`; an entry
    /// under `limit` is incremented; a full entry denies without mutation.
    pub fn admit(&self, endpoint: &str, limit: u32, window: Duration) -> Admission {
        let now = Instant::now();
        let mut entries = self.entries.lock().expect("rate limiter mutex poisoned");

        match entries.get_mut(endpoint) {
            Some(entry) if entry.reset_at > now => {
                if entry.count < limit {
                    entry.count += 1;
                    Admission::Allowed
                } else {
                    let remaining = entry.reset_at.saturating_duration_since(now);
                    let retry_after_secs = remaining.as_millis().div_ceil(1000) as u64;
                    metrics::record_rate_limited(endpoint);
                    Admission::Denied { retry_after_secs }
                }
            }
            _ => {
                entries.insert(
                    endpoint.to_string(),
                    WindowEntry {
                        count: 1,
                        reset_at: now + window,
                    },
                );
                Admission::Allowed
            }
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allows_up_to_limit() {
        let limiter = RateLimiter::new();
        for _ in 0..3 {
            assert!(limiter.admit("POST:/book", 3, DEFAULT_WINDOW).is_allowed());
        }
        match limiter.admit("POST:/book", 3, DEFAULT_WINDOW) {
            Admission::Denied { retry_after_secs } => {
                assert!(retry_after_secs >= 1 && retry_after_secs <= 60);
            }
            Admission::Allowed => panic!("fourth call must be denied"),
        }
        // Denial must not mutate the counter: still denied.
        assert!(!limiter.admit("POST:/book", 3, DEFAULT_WINDOW).is_allowed());
    }

    #[test]
    fn test_endpoints_are_independent() {
        let limiter = RateLimiter::new();
        assert!(limiter.admit("POST:/otp", 1, DEFAULT_WINDOW).is_allowed());
        assert!(!limiter.admit("POST:/otp", 1, DEFAULT_WINDOW).is_allowed());
        assert!(limiter.admit("GET:/track", 1, DEFAULT_WINDOW).is_allowed());
    }

    #[test]
    fn test_window_reset_replaces_entry() {
        let limiter = RateLimiter::new();
        let window = Duration::from_millis(40);
        assert!(limiter.admit("GET:/x", 1, window).is_allowed());
        assert!(!limiter.admit("GET:/x", 1, window).is_allowed());

        std::thread::sleep(Duration::from_millis(60));

        // Expired window: counter restarts at 1.
        assert!(limiter.admit("GET:/x", 1, window).is_allowed());
        assert!(!limiter.admit("GET:/x", 1, window).is_allowed());
    }
}
