//! MySQL repository implementations

pub mod reflink_repository_impl;

pub use reflink_repository_impl::MySqlReflinkRepository;
