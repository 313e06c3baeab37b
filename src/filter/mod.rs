//! # Portable Filters
//!
//! Wire-safe predicate trees: the data model, its validator and its
//! JSON serializer.
//!
//! ## Lifecycle
//!
//! Trees are built once (by the translator or by deserialization) and
//! consumed by the rehydrator. They own no external resources and are
//! never mutated after construction.

pub mod errors;
pub mod node;
pub mod validator;
pub mod value;
pub mod wire;

pub use errors::{FilterError, FilterResult, ValidationDetails};
pub use node::{
    CollectionCondition, CollectionOperator, Combination, Condition, ConditionOperator, FilterNode,
    Group,
};
pub use validator::{FilterValidator, MAX_FILTER_DEPTH};
pub use value::{Scalar, ScalarKind, ScalarValue};
pub use wire::{from_json, to_json, FilterSerializer};
