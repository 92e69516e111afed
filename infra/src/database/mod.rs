//! Database module - MySQL implementations using SQLx
//!
//! This module provides:
//! - Connection pool management
//! - The MySQL reflink repository
//! - The `user_reflinks` schema

pub mod connection;
pub mod mysql;

// Re-export commonly used types
pub use connection::{DatabasePool, PoolStatistics, USER_REFLINKS_SCHEMA};
pub use mysql::MySqlReflinkRepository;
