//! # Interceptor Pipeline
//!
//! Ordered async stages around a transport call. Each stage sees the
//! request context and a handle to the rest of the chain:
//!
//! ```text
//! observe (-1000) -> filter (-100) -> cache (0) -> ... -> transport
//! ```
//!
//! Stage order is fixed when the pipeline is built. A pipeline is
//! immutable afterwards and may be shared behind an `Arc`.

pub mod context;
pub mod errors;
pub mod middleware;
#[allow(clippy::module_inception)]
pub mod pipeline;
pub mod response;

pub use context::{Body, CarriedFilter, RequestContext};
pub use errors::{PipelineError, PipelineResult};
pub use middleware::{
    CacheKeyBuilder, CachePolicy, CachingMiddleware, FilterMiddleware, Middleware,
    ObserveMiddleware,
};
pub use pipeline::{Next, Pipeline, PipelineBuilder, PipelineFuture, Transport};
pub use response::Response;
