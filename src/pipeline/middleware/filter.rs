//! Filter Middleware
//!
//! Turns a wire filter in the request body into an executable filter
//! before the request travels further. The body is validated,
//! deserialized and rehydrated for element type `E`, then replaced with
//! `Body::Filter`; downstream stages read it with `ctx.filter::<E>()`.
//!
//! Any failure rejects the request with status 400. The transport is
//! never reached with an unusable filter.

use std::marker::PhantomData;

use tracing::{debug, warn};

use crate::config::FilterConfig;
use crate::filter::{FilterResult, FilterSerializer, FilterValidator, ValidationDetails};
use crate::pipeline::context::{Body, CarriedFilter, RequestContext};
use crate::pipeline::pipeline::{Next, PipelineFuture};
use crate::pipeline::response::Response;
use crate::query::QueryFilter;
use crate::rehydrate::{Filterable, Rehydrator};

use super::Middleware;

/// Default position of the filter stage, ahead of caching
pub const FILTER_ORDER: i32 = -100;

/// Status of a rejected filter
pub const REJECTED_STATUS: u16 = 400;

/// Filter-carrying middleware for element type `E`
pub struct FilterMiddleware<E> {
    serializer: FilterSerializer,
    rehydrator: Rehydrator,
    allow_empty: bool,
    order: i32,
    _element: PhantomData<fn() -> E>,
}

impl<E: Filterable> FilterMiddleware<E> {
    pub fn new() -> Self {
        Self {
            serializer: FilterSerializer::new(),
            rehydrator: Rehydrator::new(),
            allow_empty: false,
            order: FILTER_ORDER,
            _element: PhantomData,
        }
    }

    pub fn from_config(config: &FilterConfig) -> Self {
        let middleware = Self::new().with_max_depth(config.max_depth);
        if config.allow_empty {
            middleware.allow_empty()
        } else {
            middleware
        }
    }

    /// Accept an empty body as "match everything"
    pub fn allow_empty(mut self) -> Self {
        self.allow_empty = true;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.serializer =
            FilterSerializer::with_validator(FilterValidator::new().with_max_depth(max_depth));
        self
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    /// Build the filter carried for `body`.
    ///
    /// Returns `Ok(None)` when the body already carries a filter.
    pub fn carry(&self, body: &Body) -> FilterResult<Option<CarriedFilter>> {
        let node = match body {
            Body::Filter(_) => return Ok(None),
            Body::Empty => return self.carry_empty(),
            _ if body.is_empty() => return self.carry_empty(),
            Body::Raw(text) => self.serializer.from_str(text)?,
            Body::Json(value) => self.serializer.from_value(value.clone())?,
        };
        let filter = self.rehydrator.rehydrate::<E>(&node)?;
        Ok(Some(CarriedFilter::new(Some(node), filter)))
    }

    fn carry_empty(&self) -> FilterResult<Option<CarriedFilter>> {
        if !self.allow_empty {
            return Err(ValidationDetails::missing_field("$").into());
        }
        Ok(Some(CarriedFilter::new(None, QueryFilter::<E>::always())))
    }
}

impl<E: Filterable> Default for FilterMiddleware<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E, T> Middleware<T> for FilterMiddleware<E>
where
    E: Filterable,
    T: Send + 'static,
{
    fn process<'a>(
        &'a self,
        ctx: &'a mut RequestContext,
        next: Next<'a, T>,
    ) -> PipelineFuture<'a, T> {
        Box::pin(async move {
            match self.carry(&ctx.body) {
                Ok(Some(carried)) => {
                    debug!(operation = %ctx.operation, filter = ?carried, "Filter attached");
                    ctx.body = Body::Filter(carried);
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(
                        operation = %ctx.operation,
                        request_id = %ctx.request_id,
                        code = e.code(),
                        error = %e,
                        "Rejected request filter"
                    );
                    return Ok(Response::rejected(REJECTED_STATUS, e.to_string()));
                }
            }
            next.run(ctx).await
        })
    }

    fn order(&self) -> i32 {
        self.order
    }

    fn name(&self) -> &'static str {
        "filter"
    }
}
