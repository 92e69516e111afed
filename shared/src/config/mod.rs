//! Configuration module
//!
//! - `reflink` - token hash key, TTL and sweep schedule
//! - `database` - MySQL connection and pool configuration
//! - `environment` - environment detection and logging configuration

pub mod database;
pub mod environment;
pub mod reflink;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use database::DatabaseConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use reflink::ReflinkConfig;

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    #[serde(default)]
    pub environment: Environment,

    /// Token store configuration
    #[serde(default)]
    pub reflink: ReflinkConfig,

    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let environment = Environment::from_env();
        Self {
            environment,
            reflink: ReflinkConfig::from_env(),
            database: DatabaseConfig::from_env(),
            logging: LoggingConfig::from_env(environment),
        }
    }

    /// Pick the configuration file to load
    ///
    /// An explicit path wins. Otherwise the environment's default file
    /// (e.g. `reflink.production.toml`) is used if it exists in `dir`.
    pub fn config_file_for(
        explicit: Option<PathBuf>,
        environment: Environment,
        dir: &Path,
    ) -> Option<PathBuf> {
        explicit.or_else(|| {
            let candidate = dir.join(environment.config_file());
            candidate.is_file().then_some(candidate)
        })
    }

    /// Load layered configuration
    ///
    /// Values from `REFLINK__<SECTION>__<KEY>` environment variables override
    /// the optional TOML file, which overrides the built-in defaults.
    pub fn load(file: Option<&Path>) -> Result<Self, ::config::ConfigError> {
        let mut builder = ::config::Config::builder();

        if let Some(path) = file {
            builder = builder.add_source(::config::File::from(path).required(false));
        }

        builder
            .add_source(
                ::config::Environment::with_prefix("REFLINK")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }
}
