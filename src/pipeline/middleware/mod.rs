//! Middleware Traits and Implementations
//!
//! Stages of the interceptor pipeline.

use super::context::RequestContext;
use super::pipeline::{Next, PipelineFuture};

/// Middleware trait for pipeline stages
///
/// A stage either calls `next.run(ctx)` exactly once, optionally
/// transforming the result, or short-circuits with its own response.
pub trait Middleware<T>: Send + Sync {
    /// Process the request, optionally modifying context
    fn process<'a>(
        &'a self,
        ctx: &'a mut RequestContext,
        next: Next<'a, T>,
    ) -> PipelineFuture<'a, T>;

    /// Position in the chain; lower runs first (outermost)
    fn order(&self) -> i32 {
        0
    }

    /// Stage name for logs
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Composable middleware implementations
pub mod cache;
pub mod filter;
pub mod observe;

pub use cache::{CacheKeyBuilder, CachePolicy, CachingMiddleware};
pub use filter::FilterMiddleware;
pub use observe::ObserveMiddleware;
