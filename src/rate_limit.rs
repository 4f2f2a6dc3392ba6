/// Per-identity request rate limiting
///
/// Fixed-window counter per identity (email or IP). Each identity gets a
/// budget of `max_attempts` per window; once the window elapses the
/// counter resets and the next attempt starts a fresh window.
///
/// Policy: every attempt is counted, including denied ones. A client that
/// keeps hammering while limited never earns a fresh budget by accident.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::configuration::RateLimitSettings;

/// Counter state for one identity
struct RateWindow {
    count: u32,
    window_start: Instant,
}

/// Tracks request counts per identity within fixed windows
pub struct RateLimiter {
    max_attempts: u32,
    window: Duration,
    windows: Mutex<HashMap<String, RateWindow>>,
}

impl RateLimiter {
    pub fn new(settings: &RateLimitSettings) -> Self {
        Self {
            max_attempts: settings.max_attempts,
            window: Duration::from_secs(settings.window_seconds),
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Record an attempt for `identity` and report whether it is within
    /// budget. The per-identity update is atomic under the map lock.
    pub fn allow(&self, identity: &str) -> bool {
        self.allow_at(identity, Instant::now())
    }

    fn allow_at(&self, identity: &str, now: Instant) -> bool {
        let mut windows = self.windows.lock().unwrap();

        let entry = windows.entry(identity.to_string()).or_insert(RateWindow {
            count: 0,
            window_start: now,
        });

        if now.duration_since(entry.window_start) >= self.window {
            entry.count = 0;
            entry.window_start = now;
        }

        entry.count += 1;
        let allowed = entry.count <= self.max_attempts;

        if !allowed {
            tracing::warn!(identity = identity, count = entry.count, "Rate limit exceeded");
        }

        allowed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_attempts: u32, window_seconds: u64) -> RateLimiter {
        RateLimiter::new(&RateLimitSettings {
            max_attempts,
            window_seconds,
        })
    }

    #[test]
    fn test_allows_up_to_threshold() {
        let limiter = limiter(3, 60);
        let now = Instant::now();

        assert!(limiter.allow_at("user@example.com", now));
        assert!(limiter.allow_at("user@example.com", now));
        assert!(limiter.allow_at("user@example.com", now));
    }

    #[test]
    fn test_denies_attempt_over_threshold() {
        let limiter = limiter(3, 60);
        let now = Instant::now();

        for _ in 0..3 {
            assert!(limiter.allow_at("user@example.com", now));
        }
        assert!(!limiter.allow_at("user@example.com", now));
    }

    #[test]
    fn test_new_window_resets_budget() {
        let limiter = limiter(2, 60);
        let start = Instant::now();

        assert!(limiter.allow_at("user@example.com", start));
        assert!(limiter.allow_at("user@example.com", start));
        assert!(!limiter.allow_at("user@example.com", start));

        let later = start + Duration::from_secs(61);
        assert!(limiter.allow_at("user@example.com", later));
    }

    #[test]
    fn test_denied_attempts_keep_counting() {
        let limiter = limiter(2, 60);
        let start = Instant::now();

        assert!(limiter.allow_at("user@example.com", start));
        assert!(limiter.allow_at("user@example.com", start));
        // Denied attempts still increment the counter, so the budget
        // stays exhausted within the window regardless of how often the
        // client retries.
        for _ in 0..5 {
            assert!(!limiter.allow_at("user@example.com", start));
        }
        assert!(!limiter.allow_at(
            "user@example.com",
            start + Duration::from_secs(59)
        ));
    }

    #[test]
    fn test_identities_are_independent() {
        let limiter = limiter(1, 60);
        let now = Instant::now();

        assert!(limiter.allow_at("a@example.com", now));
        assert!(!limiter.allow_at("a@example.com", now));
        assert!(limiter.allow_at("b@example.com", now));
    }
}
