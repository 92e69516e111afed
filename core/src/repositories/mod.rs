pub mod reflink;

pub use reflink::{InMemoryReflinkRepository, ReflinkRepository};
