//! Unified resilience configuration for remote calls

use super::retry::RetryConfig;

/// Retry and rate-limit configuration applied to every client call
#[derive(Debug, Clone, Default)]
pub struct ResilienceConfig {
    pub retry: RetryConfig,
    pub rate_limit: RateLimitConfig,
}

/// Client-side request rate configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub requests_per_minute: u32,
    pub burst_capacity: u32,
    pub enabled: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            // The platform throttles per access token; stay under typical
            // app-level budgets to leave headroom for retries.
            requests_per_minute: 120,
            burst_capacity: 10,
            enabled: true,
        }
    }
}

impl ResilienceConfig {
    pub fn builder() -> ResilienceConfigBuilder {
        ResilienceConfigBuilder::new()
    }

    /// Conservative preset for shared production tokens
    pub fn conservative() -> Self {
        Self {
            retry: RetryConfig::conservative(),
            rate_limit: RateLimitConfig {
                requests_per_minute: 60,
                burst_capacity: 5,
                enabled: true,
            },
        }
    }

    /// No retries, no rate limiting (tests)
    pub fn disabled() -> Self {
        Self {
            retry: RetryConfig::disabled(),
            rate_limit: RateLimitConfig {
                requests_per_minute: u32::MAX,
                burst_capacity: u32::MAX,
                enabled: false,
            },
        }
    }
}

/// Builder for ResilienceConfig
#[derive(Debug, Default)]
pub struct ResilienceConfigBuilder {
    config: ResilienceConfig,
}

impl ResilienceConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn retry_config(mut self, retry: RetryConfig) -> Self {
        self.config.retry = retry;
        self
    }

    pub fn max_retries(mut self, attempts: u32) -> Self {
        self.config.retry.max_attempts = attempts;
        self
    }

    pub fn requests_per_minute(mut self, rpm: u32) -> Self {
        self.config.rate_limit.requests_per_minute = rpm;
        self
    }

    pub fn enable_rate_limiting(mut self, enabled: bool) -> Self {
        self.config.rate_limit.enabled = enabled;
        self
    }

    pub fn build(self) -> ResilienceConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ResilienceConfig::default();
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.rate_limit.requests_per_minute, 120);
        assert!(config.rate_limit.enabled);
    }

    #[test]
    fn test_disabled_config() {
        let config = ResilienceConfig::disabled();
        assert_eq!(config.retry.max_attempts, 1);
        assert!(!config.rate_limit.enabled);
    }

    #[test]
    fn test_builder() {
        let config = ResilienceConfig::builder()
            .max_retries(5)
            .requests_per_minute(30)
            .enable_rate_limiting(false)
            .build();

        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.rate_limit.requests_per_minute, 30);
        assert!(!config.rate_limit.enabled);
    }
}
