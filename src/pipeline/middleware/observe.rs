//! Observability Middleware
//!
//! One structured log line per call: operation, duration, outcome and
//! whether the response came from the cache.

use tracing::{info, warn};

use crate::pipeline::context::RequestContext;
use crate::pipeline::pipeline::{Next, PipelineFuture};

use super::Middleware;

/// Default position of the observe stage: outermost
pub const OBSERVE_ORDER: i32 = -1000;

/// Observability middleware
#[derive(Debug, Clone)]
pub struct ObserveMiddleware {
    order: i32,
}

impl ObserveMiddleware {
    pub fn new() -> Self {
        Self {
            order: OBSERVE_ORDER,
        }
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }
}

impl Default for ObserveMiddleware {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + 'static> Middleware<T> for ObserveMiddleware {
    fn process<'a>(
        &'a self,
        ctx: &'a mut RequestContext,
        next: Next<'a, T>,
    ) -> PipelineFuture<'a, T> {
        Box::pin(async move {
            let result = next.run(ctx).await;
            let duration_ms = ctx.elapsed_ms() as u64;

            match &result {
                Ok(response) => info!(
                    request_id = %ctx.request_id,
                    operation = %ctx.operation,
                    method = %ctx.method,
                    address = %ctx.address,
                    success = response.success,
                    status = response.status,
                    cache_hit = ctx.cache_hit,
                    duration_ms,
                    "Pipeline call completed"
                ),
                Err(e) => warn!(
                    request_id = %ctx.request_id,
                    operation = %ctx.operation,
                    code = e.code(),
                    error = %e,
                    duration_ms,
                    "Pipeline call failed"
                ),
            }

            result
        })
    }

    fn order(&self) -> i32 {
        self.order
    }

    fn name(&self) -> &'static str {
        "observe"
    }
}
