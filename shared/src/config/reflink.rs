//! Reflink token store configuration

use serde::{Deserialize, Serialize};

const DEFAULT_HASH_KEY: &str = "reflink-development-key-change-in-production";

/// Settings for issuing and sweeping reflink tokens
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReflinkConfig {
    /// Secret used to key the token HMAC
    #[serde(default = "default_hash_key")]
    pub hash_key: String,

    /// Token lifetime in seconds
    #[serde(default = "default_ttl_seconds")]
    pub ttl_seconds: i64,

    /// How often the expired-token sweep runs (in seconds)
    #[serde(default = "default_sweep_interval_seconds")]
    pub sweep_interval_seconds: u64,

    /// Whether the background sweep runs at all
    #[serde(default = "default_sweep_enabled")]
    pub sweep_enabled: bool,
}

impl Default for ReflinkConfig {
    fn default() -> Self {
        Self {
            hash_key: default_hash_key(),
            ttl_seconds: default_ttl_seconds(),
            sweep_interval_seconds: default_sweep_interval_seconds(),
            sweep_enabled: default_sweep_enabled(),
        }
    }
}

impl ReflinkConfig {
    /// Create a new configuration with the given hash key
    pub fn new(hash_key: impl Into<String>) -> Self {
        Self {
            hash_key: hash_key.into(),
            ..Default::default()
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let hash_key = std::env::var("REFLINK_HASH_KEY").unwrap_or(defaults.hash_key);
        let ttl_seconds = std::env::var("REFLINK_TTL_SECONDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.ttl_seconds);
        let sweep_interval_seconds = std::env::var("REFLINK_SWEEP_INTERVAL_SECONDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.sweep_interval_seconds);
        let sweep_enabled = std::env::var("REFLINK_SWEEP_ENABLED")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.sweep_enabled);

        Self {
            hash_key,
            ttl_seconds,
            sweep_interval_seconds,
            sweep_enabled,
        }
    }

    /// Set the token lifetime in seconds
    pub fn with_ttl_seconds(mut self, seconds: i64) -> Self {
        self.ttl_seconds = seconds;
        self
    }

    /// Set the sweep interval in seconds
    pub fn with_sweep_interval_seconds(mut self, seconds: u64) -> Self {
        self.sweep_interval_seconds = seconds;
        self
    }

    /// Enable or disable the background sweep
    pub fn with_sweep_enabled(mut self, enabled: bool) -> Self {
        self.sweep_enabled = enabled;
        self
    }

    /// Check if using the development hash key (security warning)
    pub fn is_using_default_key(&self) -> bool {
        self.hash_key == DEFAULT_HASH_KEY
    }
}

fn default_hash_key() -> String {
    String::from(DEFAULT_HASH_KEY)
}

fn default_ttl_seconds() -> i64 {
    3600 // 1 hour
}

fn default_sweep_interval_seconds() -> u64 {
    3600
}

fn default_sweep_enabled() -> bool {
    true
}
