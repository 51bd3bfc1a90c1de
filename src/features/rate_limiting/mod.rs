//! # Feature: Rate Limiting
//!
//! Soft spam protection for command dispatch. Sliding window per actor,
//! backed by DashMap for thread-safe concurrent access. State is in-memory
//! only and lost on restart; rate limiting is a courtesy brake, not a
//! correctness guarantee.

use dashmap::DashMap;
use std::time::{Duration, Instant};

/// Injected rate-limit service: one timestamp list per actor id, expired
/// entries evicted from the front before each count check.
#[derive(Clone)]
pub struct RateLimiter {
    requests: DashMap<String, Vec<Instant>>,
    max_requests: usize,
    time_window: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: usize, time_window: Duration) -> Self {
        RateLimiter {
            requests: DashMap::new(),
            max_requests,
            time_window,
        }
    }

    /// Record one invocation attempt for the actor. Returns `false` when
    /// the actor has exhausted the window; the attempt is not recorded in
    /// that case.
    pub fn try_acquire(&self, actor_id: &str) -> bool {
        let now = Instant::now();
        let mut entry = self.requests.entry(actor_id.to_string()).or_default();

        entry.retain(|&time| now.duration_since(time) < self.time_window);

        if entry.len() >= self.max_requests {
            false
        } else {
            entry.push(now);
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    #[test]
    fn test_rate_limiter_allows_under_limit() {
        let limiter = RateLimiter::new(3, Duration::from_secs(1));

        assert!(limiter.try_acquire("user1"));
        assert!(limiter.try_acquire("user1"));
        assert!(limiter.try_acquire("user1"));
    }

    #[test]
    fn test_rate_limiter_blocks_over_limit() {
        let limiter = RateLimiter::new(2, Duration::from_secs(1));

        assert!(limiter.try_acquire("user1"));
        assert!(limiter.try_acquire("user1"));
        assert!(!limiter.try_acquire("user1"));
    }

    #[tokio::test]
    async fn test_rate_limiter_resets_after_window() {
        let limiter = RateLimiter::new(1, Duration::from_millis(100));

        assert!(limiter.try_acquire("user1"));
        assert!(!limiter.try_acquire("user1"));

        sleep(Duration::from_millis(150)).await;
        assert!(limiter.try_acquire("user1"));
    }

    #[test]
    fn test_rate_limiter_per_actor() {
        let limiter = RateLimiter::new(1, Duration::from_secs(1));

        assert!(limiter.try_acquire("user1"));
        assert!(limiter.try_acquire("user2"));
        assert!(!limiter.try_acquire("user1"));
        assert!(!limiter.try_acquire("user2"));
    }

    #[test]
    fn test_rejected_attempt_not_recorded() {
        let limiter = RateLimiter::new(1, Duration::from_secs(1));

        assert!(limiter.try_acquire("user1"));
        // Hammering while blocked must not extend the window.
        for _ in 0..10 {
            assert!(!limiter.try_acquire("user1"));
        }
        let entry = limiter.requests.get("user1").unwrap();
        assert_eq!(entry.len(), 1);
    }
}
