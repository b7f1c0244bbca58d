//! Tool configuration
//!
//! Loaded from `~/.config/adclone/config.toml` with environment overrides.
//! The access token is supplied here (or via `ADCLONE_ACCESS_TOKEN`); the
//! engine treats its validity as a precondition and never refreshes it.

use crate::api::resilience::{RateLimitConfig, ResilienceConfig, RetryConfig};
use crate::clone::models::DestinationAccount;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub access_token: Option<String>,
    /// Per-destination-account overrides, keyed by account id (with or
    /// without the `act_` prefix)
    #[serde(default)]
    pub accounts: HashMap<String, AccountOverrides>,
    #[serde(default)]
    pub api: ApiOptions,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountOverrides {
    pub page_id: Option<String>,
    pub pixel_id: Option<String>,
}

/// Resilience tuning; unset fields fall back to the built-in defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiOptions {
    pub retry_max_attempts: Option<u32>,
    pub retry_base_delay_ms: Option<u64>,
    pub rate_limit_requests_per_minute: Option<u32>,
    pub rate_limit_burst_capacity: Option<u32>,
}

impl Config {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("adclone").join("config.toml"))
    }

    /// Load from the default location, tolerating a missing file
    pub fn load() -> anyhow::Result<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::from_env(Self::default())),
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config {}: {}", path.display(), e))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("invalid config {}: {}", path.display(), e))?;
        Ok(Self::from_env(config))
    }

    fn from_env(mut config: Config) -> Config {
        if let Ok(token) = std::env::var("ADCLONE_ACCESS_TOKEN") {
            if !token.is_empty() {
                config.access_token = Some(token);
            }
        }
        config
    }

    pub fn require_token(&self) -> anyhow::Result<String> {
        self.access_token.clone().ok_or_else(|| {
            anyhow::anyhow!(
                "no access token configured; set access_token in the config file or ADCLONE_ACCESS_TOKEN"
            )
        })
    }

    /// Destination account with any configured overrides applied
    pub fn destination(&self, account_id: &str) -> DestinationAccount {
        let stripped = account_id.strip_prefix("act_").unwrap_or(account_id);
        let overrides = self
            .accounts
            .get(account_id)
            .or_else(|| self.accounts.get(stripped))
            .or_else(|| self.accounts.get(&format!("act_{}", stripped)));

        DestinationAccount {
            account_id: account_id.to_string(),
            page_id: overrides.and_then(|o| o.page_id.clone()),
            pixel_id: overrides.and_then(|o| o.pixel_id.clone()),
        }
    }

    pub fn resilience(&self) -> ResilienceConfig {
        let mut retry = RetryConfig::default();
        if let Some(attempts) = self.api.retry_max_attempts {
            retry.max_attempts = attempts;
        }
        if let Some(base_ms) = self.api.retry_base_delay_ms {
            retry.base_delay = Duration::from_millis(base_ms);
        }

        let mut rate_limit = RateLimitConfig::default();
        if let Some(rpm) = self.api.rate_limit_requests_per_minute {
            rate_limit.requests_per_minute = rpm;
        }
        if let Some(burst) = self.api.rate_limit_burst_capacity {
            rate_limit.burst_capacity = burst;
        }

        ResilienceConfig { retry, rate_limit }
    }
}
