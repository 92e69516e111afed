//! Reflink token service module
//!
//! This module handles the lifecycle of reflink tokens:
//! - Keyed token generation
//! - Issuing tokens with invalidation of the previous token per user and intent
//! - Expiry-aware validation and consumption
//! - Background sweep of expired tokens

mod clock;
mod generator;
mod service;
mod sweep;

#[cfg(test)]
mod tests;

pub use clock::{Clock, ManualClock, SystemClock};
pub use generator::TokenGenerator;
pub use service::ReflinkTokenService;
pub use sweep::{ReflinkSweepService, SweepConfig, SweepResult};
