//! Periodic purge of expired reflink tokens
//!
//! Configuration comes from `REFLINK_CONFIG_FILE` when set, then from the
//! environment's `reflink.<env>.toml` in the working directory if present,
//! otherwise from plain environment variables (a `.env` file is honoured).

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;

use rl_core::services::reflink::{ReflinkSweepService, ReflinkTokenService, SweepConfig};
use rl_infra::database::{DatabasePool, MySqlReflinkRepository};
use rl_infra::logging::init_tracing;
use rl_shared::config::{AppConfig, Environment};

fn load_config() -> anyhow::Result<AppConfig> {
    let explicit = std::env::var_os("REFLINK_CONFIG_FILE").map(PathBuf::from);
    let cwd = std::env::current_dir().context("Failed to resolve working directory")?;

    match AppConfig::config_file_for(explicit, Environment::from_env(), &cwd) {
        Some(path) => AppConfig::load(Some(&path))
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(AppConfig::from_env()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = load_config()?;
    init_tracing(&config.logging)?;

    tracing::info!(
        environment = %config.environment,
        ttl_seconds = config.reflink.ttl_seconds,
        interval_seconds = config.reflink.sweep_interval_seconds,
        "Starting reflink sweeper"
    );

    if config.reflink.is_using_default_key() && config.environment.is_production() {
        anyhow::bail!("REFLINK_HASH_KEY must be set in production");
    }

    let pool = DatabasePool::new(config.database.clone()).await?;
    if !pool.health_check().await? {
        anyhow::bail!("Database health check failed");
    }
    pool.run_migrations().await?;

    let repository = Arc::new(MySqlReflinkRepository::new(pool.get_pool().clone()));
    let store = Arc::new(ReflinkTokenService::new(repository, &config.reflink)?);
    let sweep = Arc::new(ReflinkSweepService::new(
        store,
        SweepConfig::from(&config.reflink),
    ));

    let Some(handle) = sweep.start_background_task() else {
        tracing::warn!("REFLINK_SWEEP_ENABLED is false, nothing to do");
        pool.close().await;
        return Ok(());
    };

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;

    tracing::info!("Shutdown signal received");
    handle.abort();
    tracing::info!("{}", pool.get_statistics());
    pool.close().await;

    Ok(())
}
