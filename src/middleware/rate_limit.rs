//! In-memory sliding-window rate limiter for the anonymous endpoints.
//! Single-process only; a multi-instance deployment needs a shared store.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

#[derive(Clone)]
pub struct RateLimiter {
    hits: Arc<RwLock<HashMap<String, VecDeque<Instant>>>>,
    max_requests: usize,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: usize, window_secs: u64) -> Self {
        Self {
            hits: Arc::new(RwLock::new(HashMap::new())),
            max_requests,
            window: Duration::from_secs(window_secs),
        }
    }

    /// Record a hit for `key` (an IP, usually) and report whether it is
    /// still under the limit for the current window.
    pub async fn allow(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut hits = self.hits.write().await;
        let history = hits.entry(key.to_string()).or_default();

        while let Some(&oldest) = history.front() {
            if now.duration_since(oldest) >= self.window {
                history.pop_front();
            } else {
                break;
            }
        }

        if history.len() < self.max_requests {
            history.push_back(now);
            true
        } else {
            false
        }
    }

    /// Drop keys whose entire history has aged out of the window. Called
    /// periodically from the scheduler so idle IPs don't accumulate.
    pub async fn prune(&self) {
        let now = Instant::now();
        let mut hits = self.hits.write().await;
        hits.retain(|_, history| {
            history.retain(|&hit| now.duration_since(hit) < self.window);
            !history.is_empty()
        });
        tracing::debug!("Rate limiter prune: {} active keys", hits.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn blocks_after_the_limit_within_a_window() {
        let limiter = RateLimiter::new(2, 60);

        assert!(limiter.allow("10.0.0.1").await);
        assert!(limiter.allow("10.0.0.1").await);
        assert!(!limiter.allow("10.0.0.1").await);
    }

    #[tokio::test]
    async fn keys_are_limited_independently() {
        let limiter = RateLimiter::new(1, 60);

        assert!(limiter.allow("10.0.0.1").await);
        assert!(!limiter.allow("10.0.0.1").await);
        assert!(limiter.allow("10.0.0.2").await);
    }

    #[tokio::test]
    async fn prune_drops_idle_keys() {
        let limiter = RateLimiter::new(5, 1);

        limiter.allow("10.0.0.1").await;
        limiter.allow("10.0.0.2").await;

        tokio::time::sleep(Duration::from_millis(1100)).await;
        limiter.prune().await;

        let hits = limiter.hits.read().await;
        assert!(hits.is_empty());
    }
}
