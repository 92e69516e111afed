//! Periodic sweep of expired reflink tokens
//!
//! Validity is computed at query time, so the sweep only reclaims storage; it
//! is never needed for correctness of create/load/exists.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use rl_shared::config::ReflinkConfig;

use crate::errors::DomainError;
use crate::repositories::ReflinkRepository;

use super::service::ReflinkTokenService;

/// Configuration for the sweep service
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// How often to run the sweep (in seconds)
    pub interval_seconds: u64,
    /// Whether to enable automatic sweeping
    pub enabled: bool,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 3600, // Run every hour
            enabled: true,
        }
    }
}

impl From<&ReflinkConfig> for SweepConfig {
    fn from(config: &ReflinkConfig) -> Self {
        Self {
            interval_seconds: config.sweep_interval_seconds,
            enabled: config.sweep_enabled,
        }
    }
}

/// Service that purges expired tokens on a schedule
pub struct ReflinkSweepService<R: ReflinkRepository + 'static> {
    store: Arc<ReflinkTokenService<R>>,
    config: SweepConfig,
}

impl<R: ReflinkRepository> ReflinkSweepService<R> {
    /// Create a new sweep service
    pub fn new(store: Arc<ReflinkTokenService<R>>, config: SweepConfig) -> Self {
        Self { store, config }
    }

    /// Run a single sweep cycle
    ///
    /// # Returns
    /// * `Ok(SweepResult)` - Summary of the cycle; a failed purge is recorded
    ///   in `errors` rather than aborting
    /// * `Err(DomainError)` - Reserved for failures outside the purge itself
    pub async fn run_sweep(&self) -> Result<SweepResult, DomainError> {
        if !self.config.enabled {
            return Ok(SweepResult::default());
        }

        info!("Starting reflink sweep cycle");

        let mut result = SweepResult::default();

        match self.store.delete_expired().await {
            Ok(count) => {
                result.expired_tokens_deleted = count;
                info!("Deleted {} expired reflink tokens", count);
            }
            Err(e) => {
                error!("Failed to sweep expired reflink tokens: {}", e);
                result.errors.push(format!("Sweep error: {}", e));
            }
        }

        Ok(result)
    }

    /// Start the sweep as a background task
    ///
    /// Spawns a tokio task that runs [`run_sweep`](Self::run_sweep) at the
    /// configured interval. Returns `None` when the sweep is disabled.
    pub fn start_background_task(self: Arc<Self>) -> Option<JoinHandle<()>> {
        if !self.config.enabled {
            warn!("Reflink sweep service is disabled");
            return None;
        }

        let interval = Duration::from_secs(self.config.interval_seconds.max(1));

        Some(tokio::spawn(async move {
            info!(
                "Reflink sweep service started - will run every {} seconds",
                interval.as_secs()
            );

            let mut interval_timer = tokio::time::interval(interval);

            loop {
                interval_timer.tick().await;

                match self.run_sweep().await {
                    Ok(result) => {
                        if !result.errors.is_empty() {
                            warn!("Sweep completed with errors: {:?}", result.errors);
                        }
                    }
                    Err(e) => {
                        error!("Reflink sweep cycle failed: {}", e);
                    }
                }
            }
        }))
    }
}

/// Result of a sweep cycle
#[derive(Debug, Default)]
pub struct SweepResult {
    /// Number of expired tokens deleted
    pub expired_tokens_deleted: u64,
    /// Any errors encountered during the sweep
    pub errors: Vec<String>,
}

impl SweepResult {
    /// Check if the sweep was successful (no errors)
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}
