//! Domain entities representing core business objects.

pub mod reflink;


// Re-export commonly used types
pub use reflink::{
    expiry_cutoff, Intent, Properties, ReflinkToken, ReflinkType, ReflinkUser,
    DEFAULT_TTL_SECONDS, TOKEN_LENGTH, TOKEN_RANDOM_BYTES,
};
