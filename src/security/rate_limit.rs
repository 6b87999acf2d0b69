//! Fixed-window rate limiting.
//!
//! A [`RateLimiter`] admits at most `max_requests` calls per key in each
//! window of `window` length. The window for a key opens on its first call
//! and is replaced wholesale once it has elapsed.
//!
//! This is a fixed-window counter, not a sliding window. A burst straddling
//! a window boundary can be admitted up to `2 * max_requests` times in quick
//! succession: the tail of one window plus the head of the next.
//!
//! Stale keys are reclaimed without help from the caller: every call has a
//! small chance of triggering a sweep, and [`RateLimiter::spawn_sweeper`]
//! runs one on a timer.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::error::GatewayError;
use crate::observability::metrics;
use crate::security::auth::CallerId;

/// One sweep per this many admission checks, on average.
const SWEEP_ODDS: u32 = 100;

/// Per-key counter for the current window.
#[derive(Debug, Clone, Copy)]
struct RateWindow {
    count: u32,
    window_start: Instant,
    last_seen: Instant,
}

impl RateWindow {
    fn open(now: Instant) -> Self {
        Self {
            count: 1,
            window_start: now,
            last_seen: now,
        }
    }

    fn is_expired(&self, now: Instant, window: Duration) -> bool {
        now.saturating_duration_since(self.window_start) >= window
    }

    fn is_idle(&self, now: Instant, window: Duration) -> bool {
        now.saturating_duration_since(self.last_seen) >= window
    }
}

/// Keyed fixed-window request admission.
pub struct RateLimiter {
    name: &'static str,
    max_requests: u32,
    window: Duration,
    windows: Mutex<HashMap<String, RateWindow>>,
}

impl RateLimiter {
    /// Create a limiter. Both values are fixed for the limiter's lifetime.
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            name: "default",
            max_requests,
            window,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Label used in logs and metrics.
    pub fn named(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Admit or reject one request for `key`.
    pub fn is_allowed(&self, key: &str) -> bool {
        let now = Instant::now();
        if fastrand::u32(..SWEEP_ODDS) == 0 {
            self.cleanup_at(now);
        }
        self.is_allowed_at(key, now)
    }

    /// Admission check against an explicit clock reading.
    pub fn is_allowed_at(&self, key: &str, now: Instant) -> bool {
        if self.max_requests == 0 {
            return false;
        }

        let mut windows = self.lock();
        match windows.get_mut(key) {
            None => {
                windows.insert(key.to_string(), RateWindow::open(now));
                true
            }
            Some(entry) if entry.is_expired(now, self.window) => {
                *entry = RateWindow::open(now);
                true
            }
            Some(entry) => {
                entry.last_seen = now;
                if entry.count < self.max_requests {
                    entry.count += 1;
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Forget `key` entirely, restoring its full quota.
    pub fn reset(&self, key: &str) {
        self.lock().remove(key);
    }

    /// Drop every key whose window has expired and that has been idle since.
    ///
    /// Returns the number of evicted keys.
    pub fn cleanup(&self) -> usize {
        self.cleanup_at(Instant::now())
    }

    pub fn cleanup_at(&self, now: Instant) -> usize {
        let mut windows = self.lock();
        let before = windows.len();
        windows.retain(|_, entry| {
            !(entry.is_expired(now, self.window) && entry.is_idle(now, self.window))
        });
        let evicted = before - windows.len();
        metrics::record_tracked_keys(self.name, windows.len());

        if evicted > 0 {
            tracing::debug!(limiter = self.name, evicted, remaining = windows.len(), "Evicted idle rate limit windows");
        }
        evicted
    }

    /// Number of keys currently tracked.
    pub fn tracked_keys(&self) -> usize {
        self.lock().len()
    }

    /// Run [`RateLimiter::cleanup`] every `interval` until shutdown.
    pub fn spawn_sweeper(
        self: Arc<Self>,
        interval: Duration,
        mut shutdown: broadcast::Receiver<()>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        self.cleanup();
                    }
                    _ = shutdown.recv() => {
                        tracing::debug!(limiter = self.name, "Rate limit sweeper stopping");
                        break;
                    }
                }
            }
        })
    }

    // A panic while holding the lock cannot leave a window half-updated,
    // so a poisoned map is still consistent.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, RateWindow>> {
        self.windows.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Middleware applying the per-caller limiter.
///
/// Callers are keyed by their credential when authenticated, otherwise by
/// peer IP.
pub async fn caller_rate_limit_middleware(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let key = if let Some(caller) = request.extensions().get::<CallerId>() {
        caller.0.clone()
    } else if let Some(ConnectInfo(addr)) = request.extensions().get::<ConnectInfo<SocketAddr>>() {
        addr.ip().to_string()
    } else {
        "anonymous".to_string()
    };

    if limiter.is_allowed(&key) {
        next.run(request).await
    } else {
        tracing::warn!(limiter = limiter.name(), "Caller rate limit exceeded");
        metrics::record_rate_limited(limiter.name());
        GatewayError::RateLimitExceeded.into_response()
    }
}
