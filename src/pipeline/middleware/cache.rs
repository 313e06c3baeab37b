//! Caching Middleware
//!
//! Memoizes successful responses in an injected `CacheStore`.
//!
//! The key is a SHA-256 digest of the operation, method, address, the
//! allow-listed headers, the carried filter and the response type,
//! rendered `v1:pipe:<hex>`. A filter placed on the context by an
//! earlier stage enters the key as its canonical wire text.
//! Per-call metadata can switch caching off (`cache.disabled`) or set
//! the TTL (`cache.duration_ms`). Store failures never fail a call:
//! they are logged and treated as a miss or a skipped write.

use std::any::type_name;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::cache::{CachePriority, CacheResult, CacheStore};
use crate::config::CacheConfig;
use crate::filter::FilterSerializer;
use crate::pipeline::context::{Body, RequestContext};
use crate::pipeline::errors::PipelineError;
use crate::pipeline::pipeline::{Next, PipelineFuture};
use crate::pipeline::response::Response;

use super::Middleware;

/// Version prefix of every key; bump to orphan all stored entries
pub const CACHE_KEY_VERSION: &str = "v1";

/// Metadata key: `true` bypasses the cache for this call
pub const CACHE_DISABLED: &str = "cache.disabled";

/// Metadata key: TTL in milliseconds for this call
pub const CACHE_DURATION_MS: &str = "cache.duration_ms";

/// Default position of the caching stage
pub const CACHE_ORDER: i32 = 0;

type CacheablePredicate<T> = dyn Fn(&RequestContext, &Response<T>) -> bool + Send + Sync;
type RefreshPredicate = dyn Fn(&RequestContext) -> bool + Send + Sync;

/// Caching rules for one operation
pub struct CachePolicy<T> {
    duration: Option<Duration>,
    priority: CachePriority,
    cacheable: Option<Arc<CacheablePredicate<T>>>,
    refresh: Option<Arc<RefreshPredicate>>,
}

impl<T> Clone for CachePolicy<T> {
    fn clone(&self) -> Self {
        Self {
            duration: self.duration,
            priority: self.priority,
            cacheable: self.cacheable.clone(),
            refresh: self.refresh.clone(),
        }
    }
}

impl<T> Default for CachePolicy<T> {
    fn default() -> Self {
        Self {
            duration: None,
            priority: CachePriority::Normal,
            cacheable: None,
            refresh: None,
        }
    }
}

impl<T> CachePolicy<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn with_priority(mut self, priority: CachePriority) -> Self {
        self.priority = priority;
        self
    }

    /// Store a successful response only when `predicate` agrees
    pub fn cacheable_when(
        mut self,
        predicate: impl Fn(&RequestContext, &Response<T>) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.cacheable = Some(Arc::new(predicate));
        self
    }

    /// Skip the lookup and overwrite the entry when `predicate` holds
    pub fn refresh_when(
        mut self,
        predicate: impl Fn(&RequestContext) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.refresh = Some(Arc::new(predicate));
        self
    }

    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    pub fn priority(&self) -> CachePriority {
        self.priority
    }

    fn is_cacheable(&self, ctx: &RequestContext, response: &Response<T>) -> bool {
        self.cacheable.as_ref().map_or(true, |p| p(ctx, response))
    }

    fn should_refresh(&self, ctx: &RequestContext) -> bool {
        self.refresh.as_ref().is_some_and(|p| p(ctx))
    }
}

/// Builds cache keys from the parts of a request that select its response
#[derive(Debug, Clone, Default)]
pub struct CacheKeyBuilder {
    allowed_headers: Vec<String>,
    serializer: FilterSerializer,
}

impl CacheKeyBuilder {
    /// Header names are matched case-insensitively
    pub fn new<I, S>(allowed_headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut allowed_headers: Vec<String> = allowed_headers
            .into_iter()
            .map(|h| h.as_ref().trim().to_ascii_lowercase())
            .filter(|h| !h.is_empty())
            .collect();
        allowed_headers.sort();
        allowed_headers.dedup();
        Self {
            allowed_headers,
            serializer: FilterSerializer::new(),
        }
    }

    pub fn allowed_headers(&self) -> &[String] {
        &self.allowed_headers
    }

    /// Key for a request whose response type is `T`
    pub fn build<T>(&self, ctx: &RequestContext) -> String {
        let mut hasher = Sha256::new();
        for part in [
            ctx.operation.as_str(),
            ctx.method.as_str(),
            ctx.address.as_str(),
        ] {
            hasher.update(part.as_bytes());
            hasher.update([0u8]);
        }
        for name in &self.allowed_headers {
            hasher.update(name.as_bytes());
            match ctx.header(name) {
                Some(value) => {
                    hasher.update([1u8]);
                    hasher.update(value.as_bytes());
                }
                None => hasher.update([2u8]),
            }
            hasher.update([0u8]);
        }
        if let Body::Filter(carried) = &ctx.body {
            match carried.node() {
                Some(node) => {
                    let text = self
                        .serializer
                        .to_string(node)
                        .unwrap_or_else(|_| node.to_string());
                    hasher.update([1u8]);
                    hasher.update(text.as_bytes());
                }
                None => hasher.update([2u8]),
            }
            hasher.update([0u8]);
        }
        hasher.update(type_name::<T>().as_bytes());

        format!("{}:pipe:{}", CACHE_KEY_VERSION, hex::encode(hasher.finalize()))
    }
}

/// Caching middleware
pub struct CachingMiddleware<T> {
    store: Arc<dyn CacheStore>,
    keys: CacheKeyBuilder,
    enabled: bool,
    default_duration: Duration,
    policies: HashMap<String, CachePolicy<T>>,
    order: i32,
}

impl<T> CachingMiddleware<T>
where
    T: Serialize + DeserializeOwned + Send + 'static,
{
    pub fn new(store: Arc<dyn CacheStore>, config: &CacheConfig) -> Self {
        Self {
            store,
            keys: CacheKeyBuilder::new(&config.allowed_headers),
            enabled: config.enabled,
            default_duration: config.default_duration(),
            policies: HashMap::new(),
            order: CACHE_ORDER,
        }
    }

    /// Register the policy for `operation`
    pub fn with_policy(mut self, operation: impl Into<String>, policy: CachePolicy<T>) -> Self {
        self.policies.insert(operation.into(), policy);
        self
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    pub fn key_for(&self, ctx: &RequestContext) -> String {
        self.keys.build::<T>(ctx)
    }

    /// Metadata override, then the operation policy, then the configured default
    fn resolve_duration(&self, ctx: &RequestContext, policy: Option<&CachePolicy<T>>) -> Duration {
        ctx.metadata_u64(CACHE_DURATION_MS)
            .map(Duration::from_millis)
            .or_else(|| policy.and_then(CachePolicy::duration))
            .unwrap_or(self.default_duration)
    }

    async fn lookup(&self, key: &str) -> Option<Response<T>> {
        let bytes = match self.store.get(key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                warn!(store = self.store.store_name(), error = %e, "Cache lookup failed");
                return None;
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(response) => Some(response),
            Err(e) => {
                warn!(key, error = %e, "Discarding undecodable cache entry");
                None
            }
        }
    }

    async fn save(
        &self,
        key: &str,
        response: &Response<T>,
        ttl: Duration,
        priority: CachePriority,
    ) {
        let result: CacheResult<()> = async {
            let bytes = serde_json::to_vec(response)?;
            self.store.set(key, bytes, ttl, priority).await
        }
        .await;

        if let Err(e) = result {
            warn!(store = self.store.store_name(), code = e.code(), error = %e, "Cache store failed");
        }
    }
}

impl<T> Middleware<T> for CachingMiddleware<T>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    fn process<'a>(
        &'a self,
        ctx: &'a mut RequestContext,
        next: Next<'a, T>,
    ) -> PipelineFuture<'a, T> {
        Box::pin(async move {
            if !self.enabled || ctx.metadata_bool(CACHE_DISABLED) == Some(true) {
                return next.run(ctx).await;
            }

            let key = self.key_for(ctx);
            let policy = self.policies.get(&ctx.operation);

            if policy.is_some_and(|p| p.should_refresh(ctx)) {
                debug!(operation = %ctx.operation, key = %key, "Cache refresh requested");
            } else if let Some(response) = self.lookup(&key).await {
                if ctx.is_cancelled() {
                    return Err(PipelineError::Canceled);
                }
                debug!(operation = %ctx.operation, key = %key, "Cache hit");
                ctx.cache_hit = true;
                return Ok(response);
            } else {
                debug!(operation = %ctx.operation, key = %key, "Cache miss");
            }

            let response = next.run(ctx).await?;

            if response.success && policy.map_or(true, |p| p.is_cacheable(ctx, &response)) {
                let ttl = self.resolve_duration(ctx, policy);
                let priority = policy.map_or(CachePriority::Normal, CachePolicy::priority);
                if !ttl.is_zero() {
                    self.save(&key, &response, ttl, priority).await;
                }
            }

            Ok(response)
        })
    }

    fn order(&self) -> i32 {
        self.order
    }

    fn name(&self) -> &'static str {
        "cache"
    }
}
