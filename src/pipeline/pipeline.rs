//! Interceptor Pipeline
//!
//! Ordered async middleware chain ending in a transport call. Stages are
//! sorted once when the pipeline is built; the chain itself is immutable
//! and can serve concurrent calls.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tracing::trace;

use super::context::RequestContext;
use super::errors::{PipelineError, PipelineResult};
use super::middleware::Middleware;
use super::response::Response;

/// Boxed future returned by stages and transports
pub type PipelineFuture<'a, T> =
    Pin<Box<dyn Future<Output = PipelineResult<Response<T>>> + Send + 'a>>;

/// Next stage in the chain
pub struct Next<'a, T> {
    middleware: &'a [Arc<dyn Middleware<T>>],
    transport: &'a dyn Transport<T>,
}

impl<'a, T: Send + 'static> Next<'a, T> {
    /// Run the next middleware or the transport.
    ///
    /// Fails with `PipelineError::Canceled` if the request was canceled
    /// before the stage starts or while the transport is in flight.
    pub fn run<'b>(self, ctx: &'b mut RequestContext) -> PipelineFuture<'b, T>
    where
        'a: 'b,
    {
        Box::pin(async move {
            if ctx.is_cancelled() {
                return Err(PipelineError::Canceled);
            }

            if let Some((first, rest)) = self.middleware.split_first() {
                let next = Next {
                    middleware: rest,
                    transport: self.transport,
                };
                trace!(stage = first.name(), "Entering stage");
                first.process(ctx, next).await
            } else {
                // End of middleware chain, call the transport
                let token = ctx.cancellation().clone();
                tokio::select! {
                    biased;
                    _ = token.cancelled() => Err(PipelineError::Canceled),
                    result = self.transport.send(ctx) => result,
                }
            }
        })
    }
}

/// Performs the actual call (final stage of the pipeline)
pub trait Transport<T>: Send + Sync {
    fn send<'a>(&'a self, ctx: &'a RequestContext) -> PipelineFuture<'a, T>;
}

/// The interceptor pipeline
pub struct Pipeline<T> {
    middleware: Vec<Arc<dyn Middleware<T>>>,
    transport: Arc<dyn Transport<T>>,
}

impl<T: Send + 'static> Pipeline<T> {
    pub fn builder() -> PipelineBuilder<T> {
        PipelineBuilder::new()
    }

    /// Run a request through every stage and the transport
    pub async fn execute(&self, ctx: &mut RequestContext) -> PipelineResult<Response<T>> {
        let next = Next {
            middleware: &self.middleware,
            transport: self.transport.as_ref(),
        };
        next.run(ctx).await
    }

    /// Get the number of middleware stages
    pub fn middleware_count(&self) -> usize {
        self.middleware.len()
    }

    /// Stage names in execution order
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.middleware.iter().map(|m| m.name()).collect()
    }
}

/// Builder for pipeline construction
pub struct PipelineBuilder<T> {
    middleware: Vec<Arc<dyn Middleware<T>>>,
}

impl<T: Send + 'static> PipelineBuilder<T> {
    pub fn new() -> Self {
        Self {
            middleware: Vec::new(),
        }
    }

    /// Add middleware
    pub fn with(self, m: impl Middleware<T> + 'static) -> Self {
        self.with_shared(Arc::new(m))
    }

    /// Add middleware that is shared with other pipelines
    pub fn with_shared(mut self, m: Arc<dyn Middleware<T>>) -> Self {
        self.middleware.push(m);
        self
    }

    /// Build the pipeline with the given transport.
    ///
    /// Stages run in ascending `order()`; ties keep registration order.
    pub fn build(mut self, transport: impl Transport<T> + 'static) -> Pipeline<T> {
        self.middleware.sort_by_key(|m| m.order());
        Pipeline {
            middleware: self.middleware,
            transport: Arc::new(transport),
        }
    }
}

impl<T: Send + 'static> Default for PipelineBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}
