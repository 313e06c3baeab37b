//! # Cache Stores
//!
//! The store abstraction used by the caching interceptor, and an
//! in-memory implementation.

pub mod errors;
pub mod memory;
pub mod store;

pub use errors::{CacheError, CacheResult};
pub use memory::MemoryCacheStore;
pub use store::{CachePriority, CacheStore};
