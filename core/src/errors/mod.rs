//! Domain-specific error types and error handling.

use thiserror::Error;


/// Core domain errors
#[derive(Error, Debug)]
pub enum DomainError {
    /// The persistence layer failed (connection loss, constraint violation,
    /// token collision)
    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Token generation failed: {message}")]
    TokenGeneration { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn storage(message: impl Into<String>) -> Self {
        DomainError::Storage {
            message: message.into(),
        }
    }

    /// Error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            DomainError::Storage { .. } => "STORAGE_FAULT",
            DomainError::Configuration { .. } => "CONFIGURATION_ERROR",
            DomainError::TokenGeneration { .. } => "TOKEN_GENERATION_FAILED",
            DomainError::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    pub fn is_storage_fault(&self) -> bool {
        matches!(self, DomainError::Storage { .. })
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
