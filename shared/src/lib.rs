//! Shared configuration types for the reflink token store
//!
//! This crate provides the configuration consumed by the other workspace crates:
//! - Token store settings (hash key, TTL, sweep schedule)
//! - Database connection settings
//! - Environment detection and logging configuration

pub mod config;

// Re-export commonly used items at crate root
pub use config::{AppConfig, DatabaseConfig, Environment, LogFormat, LoggingConfig, ReflinkConfig};
