//! Token bucket rate limiter applied before every outgoing Graph API call
//!
//! One limiter per client instance. Destination-account pipelines each hold
//! their own client, so a backoff in one account never throttles another.

use super::config::RateLimitConfig;
use log::debug;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::time::sleep;

/// Token bucket limiter for outgoing request rates
#[derive(Debug, Clone)]
pub struct RateLimiter {
    inner: Arc<Mutex<RateLimiterInner>>,
    config: RateLimitConfig,
}

#[derive(Debug)]
struct RateLimiterInner {
    tokens: f64,
    last_refill: Instant,
    requests_made: u64,
    requests_rejected: u64,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        let initial_tokens = if config.enabled {
            config.burst_capacity as f64
        } else {
            f64::MAX
        };

        Self {
            inner: Arc::new(Mutex::new(RateLimiterInner {
                tokens: initial_tokens,
                last_refill: Instant::now(),
                requests_made: 0,
                requests_rejected: 0,
            })),
            config,
        }
    }

    /// Acquire a token, waiting for a refill when the bucket is empty
    pub async fn acquire(&self) {
        if !self.config.enabled {
            return;
        }

        loop {
            let should_wait = {
                let mut inner = self.inner.lock().unwrap();
                self.refill_tokens(&mut inner);

                if inner.tokens >= 1.0 {
                    inner.tokens -= 1.0;
                    inner.requests_made += 1;
                    false
                } else {
                    inner.requests_rejected += 1;
                    true
                }
            };

            if !should_wait {
                return;
            }

            let wait = self.time_per_token();
            debug!("Rate limiter: waiting {:?} for next token", wait);
            sleep(wait).await;
        }
    }

    /// Acquire a token without waiting; false when the bucket is empty
    pub fn try_acquire(&self) -> bool {
        if !self.config.enabled {
            return true;
        }

        let mut inner = self.inner.lock().unwrap();
        self.refill_tokens(&mut inner);

        if inner.tokens >= 1.0 {
            inner.tokens -= 1.0;
            inner.requests_made += 1;
            true
        } else {
            inner.requests_rejected += 1;
            false
        }
    }

    pub fn stats(&self) -> RateLimiterStats {
        let inner = self.inner.lock().unwrap();
        RateLimiterStats {
            tokens_available: inner.tokens,
            requests_made: inner.requests_made,
            requests_rejected: inner.requests_rejected,
            enabled: self.config.enabled,
        }
    }

    fn refill_tokens(&self, inner: &mut RateLimiterInner) {
        let now = Instant::now();
        let elapsed = now.duration_since(inner.last_refill);

        let tokens_per_second = self.config.requests_per_minute as f64 / 60.0;
        let tokens_to_add = elapsed.as_secs_f64() * tokens_per_second;

        if tokens_to_add > 0.0 {
            inner.tokens = (inner.tokens + tokens_to_add).min(self.config.burst_capacity as f64);
            inner.last_refill = now;
        }
    }

    fn time_per_token(&self) -> Duration {
        Duration::from_secs_f64(60.0 / self.config.requests_per_minute as f64)
    }
}

/// Rate limiter counters for logging and tests
#[derive(Debug, Clone)]
pub struct RateLimiterStats {
    pub tokens_available: f64,
    pub requests_made: u64,
    pub requests_rejected: u64,
    pub enabled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_limiter_never_rejects() {
        let limiter = RateLimiter::new(RateLimitConfig {
            requests_per_minute: 60,
            burst_capacity: 1,
            enabled: false,
        });

        for _ in 0..50 {
            assert!(limiter.try_acquire());
        }
    }

    #[test]
    fn test_burst_capacity_then_reject() {
        let limiter = RateLimiter::new(RateLimitConfig {
            requests_per_minute: 60,
            burst_capacity: 3,
            enabled: true,
        });

        assert!(limiter.try_acquire());
        assert!(limiter.try_acquire());
        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire());

        let stats = limiter.stats();
        assert_eq!(stats.requests_made, 3);
        assert_eq!(stats.requests_rejected, 1);
    }

    #[tokio::test]
    async fn test_tokens_refill_over_time() {
        let limiter = RateLimiter::new(RateLimitConfig {
            requests_per_minute: 1200, // 20 per second
            burst_capacity: 1,
            enabled: true,
        });

        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire());

        sleep(Duration::from_millis(100)).await;
        assert!(limiter.try_acquire());
    }

    #[tokio::test]
    async fn test_acquire_waits_for_token() {
        let limiter = RateLimiter::new(RateLimitConfig {
            requests_per_minute: 600, // 10 per second
            burst_capacity: 1,
            enabled: true,
        });

        limiter.acquire().await;

        let start = Instant::now();
        limiter.acquire().await;
        assert!(start.elapsed() >= Duration::from_millis(50));
    }
}
