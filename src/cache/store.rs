//! Cache store trait definition

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::errors::CacheResult;

/// Eviction priority of a cache entry.
///
/// Under pressure, lower priorities are evicted first. `NeverRemove`
/// entries are only dropped when they expire or are removed explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CachePriority {
    Low,
    #[default]
    Normal,
    High,
    NeverRemove,
}

/// Key-value store behind the caching interceptor
///
/// Implementations must be safe to share between threads. Values are
/// opaque bytes; the interceptor owns their encoding.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Get a live entry
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>>;

    /// Insert or replace an entry
    async fn set(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Duration,
        priority: CachePriority,
    ) -> CacheResult<()>;

    /// Remove an entry; returns whether it existed
    async fn remove(&self, key: &str) -> CacheResult<bool>;

    /// Store name for debugging/logging
    fn store_name(&self) -> &'static str;
}
