//! In-memory cache store
//!
//! A bounded map with per-entry TTL. When full, expired entries are
//! purged first; then the entry with the lowest priority is evicted,
//! oldest first. `NeverRemove` entries are never evicted.
//!
//! Picking a victim scans every entry, so a write into a full store is
//! O(n) in `max_entries`. Writes below capacity stay O(1).
//!
//! A TTL too large to add to `Instant::now()` is stored as "never
//! expires".

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::trace;

use super::errors::{CacheError, CacheResult};
use super::store::{CachePriority, CacheStore};
use crate::config::CacheConfig;

struct CacheEntry {
    data: Vec<u8>,
    priority: CachePriority,
    inserted_at: Instant,
    /// `None` when the TTL overflows `Instant`
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| now < at)
    }
}

/// In-memory cache store
pub struct MemoryCacheStore {
    entries: Mutex<HashMap<String, CacheEntry>>,
    max_entries: usize,
}

impl MemoryCacheStore {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            max_entries: max_entries.max(1),
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.max_entries)
    }

    /// Number of stored entries, expired ones included until purged
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Pick the entry to evict: lowest priority, then oldest. Full scan.
    fn victim(entries: &HashMap<String, CacheEntry>) -> Option<String> {
        entries
            .iter()
            .filter(|(_, e)| e.priority != CachePriority::NeverRemove)
            .min_by_key(|(_, e)| (e.priority, e.inserted_at))
            .map(|(k, _)| k.clone())
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some(entry) if entry.is_live(now) => Ok(Some(entry.data.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Duration,
        priority: CachePriority,
    ) -> CacheResult<()> {
        let now = Instant::now();
        let mut entries = self.entries.lock();

        if !entries.contains_key(key) && entries.len() >= self.max_entries {
            entries.retain(|_, e| e.is_live(now));
            if entries.len() >= self.max_entries {
                let victim = Self::victim(&entries).ok_or_else(|| {
                    CacheError::operation("cache is full of entries that cannot be evicted")
                })?;
                trace!(key = %victim, "Evicting cache entry");
                entries.remove(&victim);
            }
        }

        entries.insert(
            key.to_string(),
            CacheEntry {
                data: value,
                priority,
                inserted_at: now,
                expires_at: now.checked_add(ttl),
            },
        );
        Ok(())
    }

    async fn remove(&self, key: &str) -> CacheResult<bool> {
        Ok(self.entries.lock().remove(key).is_some())
    }

    fn store_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINUTE: Duration = Duration::from_secs(60);

    #[tokio::test]
    async fn test_set_get_remove() {
        let store = MemoryCacheStore::new(10);
        store
            .set("k", b"v".to_vec(), MINUTE, CachePriority::Normal)
            .await
            .unwrap();

        assert_eq!(store.get("k").await.unwrap(), Some(b"v".to_vec()));
        assert!(store.remove("k").await.unwrap());
        assert!(!store.remove("k").await.unwrap());
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_expired_entries_are_misses() {
        let store = MemoryCacheStore::new(10);
        store
            .set("k", b"v".to_vec(), Duration::from_millis(20), CachePriority::Normal)
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(store.get("k").await.unwrap(), None);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_eviction_prefers_low_priority() {
        let store = MemoryCacheStore::new(3);
        store.set("high", vec![1], MINUTE, CachePriority::High).await.unwrap();
        store.set("low", vec![2], MINUTE, CachePriority::Low).await.unwrap();
        store.set("normal", vec![3], MINUTE, CachePriority::Normal).await.unwrap();

        store.set("new", vec![4], MINUTE, CachePriority::Normal).await.unwrap();

        assert_eq!(store.len(), 3);
        assert!(store.get("low").await.unwrap().is_none());
        assert!(store.get("high").await.unwrap().is_some());
        assert!(store.get("normal").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_never_remove_survives_pressure() {
        let store = MemoryCacheStore::new(2);
        store.set("pinned", vec![1], MINUTE, CachePriority::NeverRemove).await.unwrap();
        store.set("a", vec![2], MINUTE, CachePriority::High).await.unwrap();
        store.set("b", vec![3], MINUTE, CachePriority::High).await.unwrap();

        assert!(store.get("pinned").await.unwrap().is_some());
        assert!(store.get("a").await.unwrap().is_none());
        assert!(store.get("b").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_full_of_pinned_entries_fails() {
        let store = MemoryCacheStore::new(1);
        store.set("pinned", vec![1], MINUTE, CachePriority::NeverRemove).await.unwrap();

        let err = store
            .set("other", vec![2], MINUTE, CachePriority::High)
            .await
            .unwrap_err();
        assert!(matches!(err, CacheError::Operation(_)));

        // replacing an existing key needs no room
        store.set("pinned", vec![9], MINUTE, CachePriority::NeverRemove).await.unwrap();
        assert_eq!(store.get("pinned").await.unwrap(), Some(vec![9]));
    }

    #[tokio::test]
    async fn test_unbounded_ttl_never_expires() {
        let store = MemoryCacheStore::new(2);
        store
            .set("forever", b"v".to_vec(), Duration::MAX, CachePriority::Normal)
            .await
            .unwrap();
        assert_eq!(store.get("forever").await.unwrap(), Some(b"v".to_vec()));

        // still an ordinary eviction candidate once the store fills up
        store.set("a", vec![1], MINUTE, CachePriority::High).await.unwrap();
        store.set("b", vec![2], MINUTE, CachePriority::High).await.unwrap();
        assert!(store.get("forever").await.unwrap().is_none());
        assert_eq!(store.len(), 2);
    }
}
