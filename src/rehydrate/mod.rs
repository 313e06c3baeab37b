//! # Predicate Rehydration
//!
//! Compiles validated filter trees into `QueryFilter<T>` for any
//! `T: Filterable`.
//!
//! ```
//! use aerofilter::filter::{ConditionOperator, FilterNode};
//! use aerofilter::filterable;
//! use aerofilter::rehydrate::rehydrate;
//!
//! struct Order {
//!     total: f64,
//!     note: Option<String>,
//! }
//!
//! filterable!(Order {
//!     scalar total,
//!     optional note,
//! });
//!
//! let node = FilterNode::condition("total", ConditionOperator::GreaterThan, "100").unwrap();
//! let filter = rehydrate::<Order>(&node).unwrap();
//! assert!(filter.matches(&Order { total: 250.0, note: None }));
//! ```
//!
//! Paths resolve one segment at a time through `Filterable::member`.
//! Inside a collection condition the predicate is compiled against the
//! element type, so its paths are relative to the element.

pub mod member;
pub mod rehydrator;

pub use member::{CollectionMember, Filterable, Member, NestedMember, ScalarMember, Target};
pub use rehydrator::{rehydrate, Rehydrator};

/// Implements [`Filterable`] for a struct from a list of member declarations.
///
/// Each entry is `kind field` or `kind field: Type`:
/// - `scalar name`: a non-null `ScalarValue` field
/// - `optional email`: an `Option<V>` field
/// - `nested address: Address`: a `Filterable` field
/// - `items orders: Order`: a `Vec` of `Filterable` elements
/// - `values tags: String`: a `Vec` of scalars
#[macro_export]
macro_rules! filterable {
    (@member $ty:ident, scalar $field:ident) => {
        $crate::rehydrate::Member::<$ty>::field(|item| &item.$field)
    };
    (@member $ty:ident, optional $field:ident) => {
        $crate::rehydrate::Member::<$ty>::optional(|item| item.$field.as_ref())
    };
    (@member $ty:ident, nested $field:ident : $elem:ty) => {
        $crate::rehydrate::Member::<$ty>::nested::<$elem>(|item| Some(&item.$field))
    };
    (@member $ty:ident, items $field:ident : $elem:ty) => {
        $crate::rehydrate::Member::<$ty>::items::<$elem>(|item| Some(&item.$field[..]))
    };
    (@member $ty:ident, values $field:ident : $elem:ty) => {
        $crate::rehydrate::Member::<$ty>::values::<$elem>(|item| Some(&item.$field[..]))
    };
    ($ty:ident { $($kind:ident $field:ident $(: $elem:ty)?),* $(,)? }) => {
        impl $crate::rehydrate::Filterable for $ty {
            fn member(name: &str) -> Option<$crate::rehydrate::Member<Self>> {
                $(
                    if name == stringify!($field) {
                        return Some($crate::filterable!(@member $ty, $kind $field $(: $elem)?));
                    }
                )*
                None
            }
        }
    };
}
