//! Request Context
//!
//! Envelope carried through the interceptor pipeline: request identity,
//! headers, body, stage metadata and the cancellation signal.

use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::filter::FilterNode;
use crate::query::QueryFilter;

/// A filter rehydrated by the filter interceptor.
///
/// Holds a `QueryFilter<E>` for the element type the interceptor was
/// built for; read it back with [`RequestContext::filter`].
#[derive(Clone)]
pub struct CarriedFilter {
    node: Option<FilterNode>,
    filter: Arc<dyn Any + Send + Sync>,
}

impl CarriedFilter {
    pub fn new<E: 'static>(node: Option<FilterNode>, filter: QueryFilter<E>) -> Self {
        Self {
            node,
            filter: Arc::new(filter),
        }
    }

    /// Tree the filter was built from; `None` for the match-all filter of an empty body
    pub fn node(&self) -> Option<&FilterNode> {
        self.node.as_ref()
    }

    pub fn get<E: 'static>(&self) -> Option<QueryFilter<E>> {
        self.filter.downcast_ref::<QueryFilter<E>>().cloned()
    }
}

impl fmt::Debug for CarriedFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.node {
            Some(node) => write!(f, "CarriedFilter({})", node),
            None => write!(f, "CarriedFilter(*)"),
        }
    }
}

/// Request body
#[derive(Debug, Clone, Default)]
pub enum Body {
    #[default]
    Empty,
    Raw(String),
    Json(Value),
    Filter(CarriedFilter),
}

impl Body {
    pub fn is_empty(&self) -> bool {
        match self {
            Body::Empty => true,
            Body::Raw(s) => s.trim().is_empty(),
            Body::Json(v) => v.is_null(),
            Body::Filter(_) => false,
        }
    }
}

/// Context carried through the pipeline
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Request ID for tracing
    pub request_id: Uuid,

    /// Logical operation name, the unit cache policies are keyed by
    pub operation: String,

    pub method: String,

    /// Target address of the call
    pub address: String,

    pub body: Body,

    /// Per-call settings read by stages (`cache.disabled`, `cache.duration_ms`)
    pub metadata: HashMap<String, Value>,

    /// Set by the caching interceptor when the response came from the store
    pub cache_hit: bool,

    /// Header names are stored lowercase
    headers: BTreeMap<String, String>,

    cancel: CancellationToken,

    started_at: Instant,
}

impl RequestContext {
    pub fn new(
        operation: impl Into<String>,
        method: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            operation: operation.into(),
            method: method.into(),
            address: address.into(),
            body: Body::Empty,
            metadata: HashMap::new(),
            cache_hit: false,
            headers: BTreeMap::new(),
            cancel: CancellationToken::new(),
            started_at: Instant::now(),
        }
    }

    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.set_header(name, value);
        self
    }

    pub fn with_body(mut self, body: Body) -> Self {
        self.body = body;
        self
    }

    /// Raw JSON text body
    pub fn with_raw(self, body: impl Into<String>) -> Self {
        self.with_body(Body::Raw(body.into()))
    }

    pub fn with_json(self, body: Value) -> Self {
        self.with_body(Body::Json(body))
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Use `token` as this request's cancellation signal
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn set_header(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
    }

    /// Header value; names are case-insensitive
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// All headers, sorted by lowercase name
    pub fn headers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Get elapsed time in milliseconds
    pub fn elapsed_ms(&self) -> u128 {
        self.started_at.elapsed().as_millis()
    }

    pub fn metadata_bool(&self, key: &str) -> Option<bool> {
        self.metadata.get(key).and_then(Value::as_bool)
    }

    pub fn metadata_u64(&self, key: &str) -> Option<u64> {
        self.metadata.get(key).and_then(Value::as_u64)
    }

    /// Filter placed on the context by the filter interceptor for element type `E`
    pub fn filter<E: 'static>(&self) -> Option<QueryFilter<E>> {
        match &self.body {
            Body::Filter(carried) => carried.get::<E>(),
            _ => None,
        }
    }

    pub fn filter_node(&self) -> Option<&FilterNode> {
        match &self.body {
            Body::Filter(carried) => carried.node(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_headers_are_case_insensitive() {
        let ctx = RequestContext::new("people.list", "GET", "/people")
            .with_header("Accept-Language", "nb")
            .with_header("X-Tenant", "a");

        assert_eq!(ctx.header("accept-language"), Some("nb"));
        assert_eq!(ctx.header("ACCEPT-LANGUAGE"), Some("nb"));
        let names: Vec<&str> = ctx.headers().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["accept-language", "x-tenant"]);
    }

    #[test]
    fn test_metadata_accessors() {
        let ctx = RequestContext::new("op", "GET", "/")
            .with_metadata("cache.disabled", json!(true))
            .with_metadata("cache.duration_ms", json!(1500));

        assert_eq!(ctx.metadata_bool("cache.disabled"), Some(true));
        assert_eq!(ctx.metadata_u64("cache.duration_ms"), Some(1500));
        assert_eq!(ctx.metadata_bool("cache.duration_ms"), None);
    }

    #[test]
    fn test_carried_filter_is_typed() {
        let filter = QueryFilter::new(|n: &i32| *n > 1);
        let ctx = RequestContext::new("op", "POST", "/")
            .with_body(Body::Filter(CarriedFilter::new(None, filter)));

        assert!(ctx.filter::<i32>().unwrap().matches(&2));
        assert!(ctx.filter::<String>().is_none());
        assert!(ctx.filter_node().is_none());
    }

    #[test]
    fn test_body_emptiness() {
        assert!(Body::Empty.is_empty());
        assert!(Body::Raw("  ".into()).is_empty());
        assert!(Body::Json(Value::Null).is_empty());
        assert!(!Body::Json(json!({})).is_empty());
    }
}
