//! # Query Filters
//!
//! Executable predicates and the helpers that combine them.

pub mod compose;
pub mod filter;

pub use compose::{
    apply, apply_all, contains, contains_ignore_case, ends_with, ends_with_ignore_case, join,
    starts_with, starts_with_ignore_case, text_match, TextMatch,
};
pub use filter::{Cancellable, FilterBy, FilterIteratorExt, QueryFilter};
