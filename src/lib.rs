//! aerofilter - portable filters and a request-interception pipeline
//!
//! - [`filter`]: the wire-safe filter tree, its validator and serializer
//! - [`translate`]: native predicate expressions to filter trees
//! - [`rehydrate`]: filter trees back to executable filters
//! - [`query`]: executable filters and their composition
//! - [`pipeline`]: ordered interceptors around a transport call
//! - [`cache`]: stores used by the caching interceptor

pub mod cache;
pub mod cli;
pub mod config;
pub mod filter;
pub mod pipeline;
pub mod query;
pub mod rehydrate;
pub mod translate;

pub use filter::{FilterError, FilterNode, FilterResult};
pub use query::QueryFilter;
pub use rehydrate::{rehydrate, Filterable};
pub use translate::translate;
