//! Per-client fixed-window rate limiting.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use axum::http::StatusCode;

use crate::config::RateLimitConfig;
use crate::http::error::ApiError;

/// Business code returned when a client exceeds its quota.
pub const RATE_LIMITED_CODE: &str = "TOO_MANY_REQUESTS";

/// Request counter for one client within the current window.
struct Window {
    started: Instant,
    count: u32,
}

impl Window {
    fn new(now: Instant) -> Self {
        Self { started: now, count: 0 }
    }

    fn try_acquire(&mut self, now: Instant, length: Duration, max: u32) -> bool {
        if now.saturating_duration_since(self.started) >= length {
            self.started = now;
            self.count = 0;
        }

        if self.count < max {
            self.count += 1;
            true
        } else {
            false
        }
    }
}

/// Client count above which lapsed windows are swept.
const SWEEP_THRESHOLD: usize = 10_000;

struct Table {
    windows: HashMap<String, Window>,
    last_sweep: Instant,
}

/// Counts requests per client key over fixed windows.
pub struct RateLimiter {
    table: Mutex<Table>,
    window: Duration,
    max_requests: u32,
    sweep_threshold: usize,
}

impl RateLimiter {
    pub fn new(window: Duration, max_requests: u32) -> Self {
        Self {
            table: Mutex::new(Table {
                windows: HashMap::new(),
                last_sweep: Instant::now(),
            }),
            window,
            max_requests,
            sweep_threshold: SWEEP_THRESHOLD,
        }
    }

    /// Limiter for `config`, or `None` when rate limiting is disabled.
    pub fn from_config(config: &RateLimitConfig) -> Option<Self> {
        config
            .enabled
            .then(|| Self::new(Duration::from_secs(config.window_secs), config.max_requests))
    }

    /// Record one request for `key`; false when the quota is spent.
    pub fn check(&self, key: &str) -> bool {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> bool {
        let mut table = self.table.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        // at most one sweep per window, and only once the table is large
        if table.windows.len() > self.sweep_threshold && now.saturating_duration_since(table.last_sweep) >= self.window {
            let window = self.window;
            table.windows.retain(|_, w| now.saturating_duration_since(w.started) < window);
            table.last_sweep = now;
        }

        table
            .windows
            .entry(key.to_string())
            .or_insert_with(|| Window::new(now))
            .try_acquire(now, self.window, self.max_requests)
    }

    /// Pipeline stage: reject when `client` is over quota.
    pub fn admit(&self, client: &str) -> Result<(), ApiError> {
        if self.check(client) {
            Ok(())
        } else {
            tracing::warn!(client = %client, "Rate limit exceeded");
            Err(ApiError::client(
                StatusCode::TOO_MANY_REQUESTS,
                RATE_LIMITED_CODE,
                "Too many requests, please try again later.",
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_per_window() {
        let limiter = RateLimiter::new(Duration::from_secs(900), 3);
        let start = Instant::now();

        assert!(limiter.check_at("1.1.1.1", start));
        assert!(limiter.check_at("1.1.1.1", start));
        assert!(limiter.check_at("1.1.1.1", start));
        assert!(!limiter.check_at("1.1.1.1", start + Duration::from_secs(60)));

        // other clients are unaffected
        assert!(limiter.check_at("2.2.2.2", start));
    }

    #[test]
    fn test_window_resets() {
        let limiter = RateLimiter::new(Duration::from_secs(900), 1);
        let start = Instant::now();

        assert!(limiter.check_at("a", start));
        assert!(!limiter.check_at("a", start + Duration::from_secs(899)));
        assert!(limiter.check_at("a", start + Duration::from_secs(900)));
    }

    #[test]
    fn test_admit_returns_client_error() {
        let limiter = RateLimiter::new(Duration::from_secs(60), 1);
        assert!(limiter.admit("a").is_ok());

        let c = limiter.admit("a").unwrap_err().classify();
        assert_eq!(c.http_status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(c.code, RATE_LIMITED_CODE);
    }

    #[test]
    fn test_sweep_runs_at_most_once_per_window() {
        let mut limiter = RateLimiter::new(Duration::from_secs(10), 5);
        limiter.sweep_threshold = 2;
        let start = Instant::now();
        let clients = |limiter: &RateLimiter| limiter.table.lock().unwrap().windows.len();

        for key in ["a", "b", "c"] {
            assert!(limiter.check_at(key, start));
        }
        assert_eq!(clients(&limiter), 3);

        // window lapsed: a, b, c are dropped before d is counted
        assert!(limiter.check_at("d", start + Duration::from_secs(11)));
        assert_eq!(clients(&limiter), 1);

        for key in ["e", "f"] {
            assert!(limiter.check_at(key, start + Duration::from_secs(12)));
        }
        // over the threshold, but the last sweep is younger than a window
        assert!(limiter.check_at("g", start + Duration::from_secs(13)));
        assert_eq!(clients(&limiter), 4);
    }

    #[test]
    fn test_disabled_config() {
        let config = RateLimitConfig {
            enabled: false,
            ..Default::default()
        };
        assert!(RateLimiter::from_config(&config).is_none());
    }
}
