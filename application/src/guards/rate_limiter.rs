//! Fixed-window rate limiter guarding provider calls.
//!
//! Each window tracks a call count and its start instant. Once the limit of
//! the current window is reached, callers are suspended until the window
//! boundary passes; the limiter never rejects.

use crate::config::{RateLimitConfig, RateLimitScope};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{info, trace};

const GLOBAL_WINDOW: &str = "*";

#[derive(Debug, Clone, Copy)]
struct RateWindow {
    count: u32,
    started_at: Instant,
}

impl RateWindow {
    fn new(now: Instant) -> Self {
        Self {
            count: 0,
            started_at: now,
        }
    }

    /// Take one slot, or return how long until the window boundary.
    fn try_take(&mut self, now: Instant, limit: u32, window: Duration) -> Option<Duration> {
        let boundary = self.started_at + window;
        if now >= boundary {
            self.count = 0;
            self.started_at = now;
        }
        if self.count < limit {
            self.count += 1;
            None
        } else {
            Some(boundary.saturating_duration_since(now))
        }
    }
}

/// Shared limiter for all sessions of a process.
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    windows: Mutex<HashMap<String, RateWindow>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Wait for capacity in the window that `provider` belongs to.
    ///
    /// Returns the total time spent waiting. Dropping the future while it
    /// waits releases nothing, since no slot has been taken yet.
    pub async fn acquire(&self, provider: &str) -> Duration {
        let key = match self.config.scope {
            RateLimitScope::PerProvider => provider,
            RateLimitScope::Global => GLOBAL_WINDOW,
        };
        let limit = self.config.calls_per_window.max(1);
        let mut waited = Duration::ZERO;

        loop {
            // The guard is dropped before sleeping.
            let wait = {
                let mut windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);
                let now = Instant::now();
                windows
                    .entry(key.to_string())
                    .or_insert_with(|| RateWindow::new(now))
                    .try_take(now, limit, self.config.window)
            };

            match wait {
                None => {
                    trace!(provider, waited_ms = waited.as_millis() as u64, "rate limit slot granted");
                    return waited;
                }
                Some(delay) => {
                    info!(
                        provider,
                        wait_ms = delay.as_millis() as u64,
                        "Rate limit reached, waiting for next window"
                    );
                    tokio::time::sleep(delay).await;
                    waited += delay;
                }
            }
        }
    }

    /// Calls counted in the current window of `provider` (0 if none yet).
    pub fn current_count(&self, provider: &str) -> u32 {
        let key = match self.config.scope {
            RateLimitScope::PerProvider => provider,
            RateLimitScope::Global => GLOBAL_WINDOW,
        };
        let windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);
        windows
            .get(key)
            .filter(|w| Instant::now() < w.started_at + self.config.window)
            .map(|w| w.count)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn limiter(limit: u32, scope: RateLimitScope) -> RateLimiter {
        RateLimiter::new(RateLimitConfig::new(limit, Duration::from_secs(1)).with_scope(scope))
    }

    #[tokio::test(start_paused = true)]
    async fn test_calls_within_limit_do_not_wait() {
        let limiter = limiter(3, RateLimitScope::PerProvider);
        let start = Instant::now();
        for _ in 0..3 {
            assert_eq!(limiter.acquire("slack").await, Duration::ZERO);
        }
        assert_eq!(Instant::now(), start);
        assert_eq!(limiter.current_count("slack"), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_excess_calls_wait_for_next_window() {
        let limiter = limiter(2, RateLimitScope::PerProvider);
        let start = Instant::now();

        limiter.acquire("slack").await;
        limiter.acquire("slack").await;
        let waited = limiter.acquire("slack").await;

        assert_eq!(waited, Duration::from_secs(1));
        assert!(Instant::now() >= start + Duration::from_secs(1));
        assert_eq!(limiter.current_count("slack"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_limit_plus_m_concurrent_callers() {
        let limiter = Arc::new(limiter(3, RateLimitScope::PerProvider));
        let start = Instant::now();

        let handles: Vec<_> = (0..5)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                tokio::spawn(async move {
                    limiter.acquire("github").await;
                    Instant::now().duration_since(start)
                })
            })
            .collect();

        let mut elapsed = Vec::new();
        for handle in handles {
            elapsed.push(handle.await.unwrap());
        }
        elapsed.sort();

        assert!(elapsed[..3].iter().all(|d| *d == Duration::ZERO));
        assert!(elapsed[3..].iter().all(|d| *d >= Duration::from_secs(1)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_per_provider_windows_are_independent() {
        let limiter = limiter(1, RateLimitScope::PerProvider);
        assert_eq!(limiter.acquire("slack").await, Duration::ZERO);
        assert_eq!(limiter.acquire("google").await, Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_global_scope_shares_one_window() {
        let limiter = limiter(1, RateLimitScope::Global);
        assert_eq!(limiter.acquire("slack").await, Duration::ZERO);
        assert_eq!(limiter.acquire("google").await, Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_resets_after_boundary() {
        let limiter = limiter(1, RateLimitScope::PerProvider);
        limiter.acquire("slack").await;
        tokio::time::advance(Duration::from_millis(1500)).await;
        assert_eq!(limiter.acquire("slack").await, Duration::ZERO);
    }
}
