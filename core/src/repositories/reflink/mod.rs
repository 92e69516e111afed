pub mod r#trait {
    pub use super::trait_::*;
}
#[path = "trait.rs"]
mod trait_;
pub mod memory;

pub use memory::InMemoryReflinkRepository;
pub use r#trait::ReflinkRepository;

#[cfg(test)]
mod tests;
