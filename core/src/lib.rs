//! # Reflink Core
//!
//! Domain layer for the reflink token store: the token record, the storage
//! trait with an in-memory implementation, and the services that issue,
//! validate and sweep time-limited tokens for password-reset and
//! email-verification links.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::entities::{
    expiry_cutoff, Intent, Properties, ReflinkToken, ReflinkType, ReflinkUser,
};
pub use errors::{DomainError, DomainResult};
pub use repositories::{InMemoryReflinkRepository, ReflinkRepository};
pub use services::{
    Clock, ManualClock, ReflinkSweepService, ReflinkTokenService, SweepConfig, SweepResult,
    SystemClock, TokenGenerator,
};
