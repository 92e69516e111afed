//! Business services containing domain logic and use cases.

pub mod reflink;

// Re-export commonly used types
pub use reflink::{
    Clock, ManualClock, ReflinkSweepService, ReflinkTokenService, SweepConfig, SweepResult,
    SystemClock, TokenGenerator,
};
