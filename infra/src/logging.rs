//! Tracing subscriber setup

use tracing_subscriber::EnvFilter;

use rl_shared::config::{LogFormat, LoggingConfig};

use crate::InfrastructureError;

/// Build the level filter for `config`
///
/// `RUST_LOG` is not consulted; `LOG_LEVEL` is already folded into
/// [`LoggingConfig::from_env`].
pub fn env_filter(config: &LoggingConfig) -> Result<EnvFilter, InfrastructureError> {
    EnvFilter::try_new(&config.level).map_err(|e| {
        InfrastructureError::Config(format!("Invalid log level '{}': {}", config.level, e))
    })
}

/// Install the global tracing subscriber
///
/// Fails if the filter does not parse or a subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), InfrastructureError> {
    let filter = env_filter(config)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(config.source_location)
        .with_line_number(config.source_location);

    let result = match config.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
    };

    result.map_err(|e| {
        InfrastructureError::General(format!("Failed to install tracing subscriber: {}", e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rl_shared::config::Environment;

    #[test]
    fn test_env_filter_accepts_directives() {
        let mut config = LoggingConfig::for_environment(Environment::Development);
        config.level = "rl_core=debug,sqlx=warn".to_string();

        assert!(env_filter(&config).is_ok());
    }

    #[test]
    fn test_env_filter_rejects_garbage() {
        let mut config = LoggingConfig::for_environment(Environment::Production);
        config.level = "rl_core=verbose".to_string();

        assert!(matches!(
            env_filter(&config),
            Err(InfrastructureError::Config(_))
        ));
    }
}
