//! # Infrastructure Layer
//!
//! Concrete storage and process wiring for the reflink token store.
//!
//! ## Architecture
//!
//! - **Database**: MySQL pool and the `ReflinkRepository` implementation using SQLx
//! - **Logging**: tracing subscriber setup driven by [`LoggingConfig`](rl_shared::config::LoggingConfig)
//!
//! ## Features
//!
//! - `mysql`: Enable MySQL database support (default)

// Re-export core types for convenience
pub use rl_core::errors::*;

/// Database module - MySQL implementations using SQLx
#[cfg(feature = "mysql")]
pub mod database;

/// Tracing subscriber initialization
pub mod logging;

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// General infrastructure error
    #[error("Infrastructure error: {0}")]
    General(String),
}

impl From<InfrastructureError> for DomainError {
    fn from(error: InfrastructureError) -> Self {
        match error {
            InfrastructureError::Database(e) => DomainError::storage(e.to_string()),
            InfrastructureError::Config(message) => DomainError::Configuration { message },
            InfrastructureError::General(message) => DomainError::Internal { message },
        }
    }
}
