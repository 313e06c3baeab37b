//! Member access for rehydration
//!
//! A `Filterable` type names its members and says how to read each one.
//! Nothing is discovered at runtime: every accessor is a plain function
//! written by hand or generated by [`filterable!`](crate::filterable).

use std::marker::PhantomData;
use std::sync::Arc;

use crate::filter::{
    CollectionCondition, CollectionOperator, Condition, ConditionOperator, FilterError,
    FilterResult, Scalar, ScalarKind, ScalarValue,
};
use crate::query::QueryFilter;

use super::rehydrator::{compile, resolve};

/// A type whose members can be addressed by filter paths
pub trait Filterable: Sized + 'static {
    /// Accessor for the member called `name`, if any
    fn member(name: &str) -> Option<Member<Self>>;
}

type ReadFn<T> = dyn for<'a> Fn(&'a T) -> Option<Scalar<'a>> + Send + Sync;

/// Pins the higher-ranked signature of a reader closure
fn reader<T, F>(read: F) -> F
where
    F: for<'a> Fn(&'a T) -> Option<Scalar<'a>>,
{
    read
}

/// The node a member path is being resolved for
#[derive(Debug, Clone, Copy)]
pub enum Target<'n> {
    Condition(&'n Condition),
    Collection(&'n CollectionCondition),
}

impl<'n> Target<'n> {
    pub fn path(&self) -> &'n str {
        match self {
            Target::Condition(c) => c.path(),
            Target::Collection(c) => c.path(),
        }
    }

    /// Full path for error reports
    pub(crate) fn full_path(&self, prefix: &str) -> String {
        format!("{}{}", prefix, self.path())
    }
}

/// Typed reader of a scalar member
pub struct ScalarMember<T> {
    kind: ScalarKind,
    read: Arc<ReadFn<T>>,
}

impl<T> Clone for ScalarMember<T> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            read: Arc::clone(&self.read),
        }
    }
}

impl<T> ScalarMember<T> {
    pub fn kind(&self) -> ScalarKind {
        self.kind
    }

    /// Current value, `None` when the member is null
    pub fn read<'a>(&self, item: &'a T) -> Option<Scalar<'a>> {
        (self.read)(item)
    }
}

/// Descends into a nested `Filterable`
pub trait NestedMember<T>: Send + Sync {
    fn compile(&self, rest: &str, target: Target<'_>, prefix: &str)
        -> FilterResult<QueryFilter<T>>;
}

/// A collection member, addressed by collection conditions
pub trait CollectionMember<T>: Send + Sync {
    fn compile(&self, target: Target<'_>, prefix: &str) -> FilterResult<QueryFilter<T>>;
}

/// How a member is read
pub enum Member<T> {
    Scalar(ScalarMember<T>),
    Nested(Box<dyn NestedMember<T>>),
    /// Collection of `Filterable` elements
    Items(Box<dyn CollectionMember<T>>),
    /// Collection of scalar elements
    Values(Box<dyn CollectionMember<T>>),
}

impl<T: 'static> Member<T> {
    /// Scalar member with a custom reader
    pub fn scalar(
        kind: ScalarKind,
        read: impl for<'a> Fn(&'a T) -> Option<Scalar<'a>> + Send + Sync + 'static,
    ) -> Self {
        Member::Scalar(ScalarMember {
            kind,
            read: Arc::new(read),
        })
    }

    /// Non-null scalar field
    pub fn field<V>(get: for<'a> fn(&'a T) -> &'a V) -> Self
    where
        V: ScalarValue + 'static,
    {
        Self::scalar(V::KIND, reader(move |item: &T| Some(get(item).to_scalar())))
    }

    /// Nullable scalar field
    pub fn optional<V>(get: for<'a> fn(&'a T) -> Option<&'a V>) -> Self
    where
        V: ScalarValue + 'static,
    {
        Self::scalar(V::KIND, reader(move |item: &T| get(item).map(|v| v.to_scalar())))
    }

    /// Nested object; `None` means the object is absent
    pub fn nested<U: Filterable>(get: for<'a> fn(&'a T) -> Option<&'a U>) -> Self {
        Member::Nested(Box::new(NestedAccess { get }))
    }

    /// Collection of `Filterable` elements; `None` means the collection is absent
    pub fn items<E: Filterable>(get: for<'a> fn(&'a T) -> Option<&'a [E]>) -> Self {
        Member::Items(Box::new(ItemsAccess { get }))
    }

    /// Collection of scalars; `None` means the collection is absent
    pub fn values<V>(get: for<'a> fn(&'a T) -> Option<&'a [V]>) -> Self
    where
        V: ScalarValue + Send + Sync + 'static,
    {
        Member::Values(Box::new(ValuesAccess {
            get,
            _value: PhantomData,
        }))
    }

    pub(crate) fn describe(&self) -> &'static str {
        match self {
            Member::Scalar(_) => "a scalar",
            Member::Nested(_) => "an object",
            Member::Items(_) => "a collection of objects",
            Member::Values(_) => "a collection of values",
        }
    }
}

struct NestedAccess<T, U> {
    get: for<'a> fn(&'a T) -> Option<&'a U>,
}

impl<T: 'static, U: Filterable> NestedMember<T> for NestedAccess<T, U> {
    fn compile(
        &self,
        rest: &str,
        target: Target<'_>,
        prefix: &str,
    ) -> FilterResult<QueryFilter<T>> {
        let inner = resolve::<U>(rest, target, prefix)?;
        // an absent parent reads as a null member
        let on_missing = matches!(
            target,
            Target::Condition(c) if c.operator() == ConditionOperator::NotEquals
        );
        let get = self.get;
        Ok(QueryFilter::new(move |item: &T| match get(item) {
            Some(nested) => inner.matches(nested),
            None => on_missing,
        }))
    }
}

struct ItemsAccess<T, E> {
    get: for<'a> fn(&'a T) -> Option<&'a [E]>,
}

impl<T: 'static, E: Filterable> CollectionMember<T> for ItemsAccess<T, E> {
    fn compile(&self, target: Target<'_>, prefix: &str) -> FilterResult<QueryFilter<T>> {
        let collection = match target {
            Target::Collection(c) => c,
            Target::Condition(c) => {
                return Err(FilterError::rehydration(
                    target.full_path(prefix),
                    format!(
                        "'{}' cannot be applied to a collection of objects",
                        c.operator()
                    ),
                ))
            }
        };

        let get = self.get;
        if collection.operator() == CollectionOperator::HasElements {
            return Ok(has_elements(get));
        }

        let predicate = collection.predicate().ok_or_else(|| {
            FilterError::rehydration(target.full_path(prefix), "missing element predicate")
        })?;
        let scope = format!("{}.", target.full_path(prefix));
        let element = compile::<E>(predicate, &scope)?;

        Ok(match collection.operator() {
            CollectionOperator::All => QueryFilter::new(move |item: &T| {
                get(item).is_some_and(|items| items.iter().all(|e| element.matches(e)))
            }),
            _ => QueryFilter::new(move |item: &T| {
                get(item).is_some_and(|items| items.iter().any(|e| element.matches(e)))
            }),
        })
    }
}

struct ValuesAccess<T, V> {
    get: for<'a> fn(&'a T) -> Option<&'a [V]>,
    _value: PhantomData<fn() -> V>,
}

impl<T, V> CollectionMember<T> for ValuesAccess<T, V>
where
    T: 'static,
    V: ScalarValue + Send + Sync + 'static,
{
    fn compile(&self, target: Target<'_>, prefix: &str) -> FilterResult<QueryFilter<T>> {
        let get = self.get;
        match target {
            Target::Collection(c) if c.operator() == CollectionOperator::HasElements => {
                Ok(has_elements(get))
            }
            Target::Collection(c) => Err(FilterError::rehydration(
                target.full_path(prefix),
                format!(
                    "'{}' needs element members; this is a collection of values",
                    c.operator().as_str()
                ),
            )),
            Target::Condition(c) if c.operator() == ConditionOperator::Contains => {
                let wanted = Scalar::parse(V::KIND, c.value())
                    .map_err(|reason| FilterError::rehydration(target.full_path(prefix), reason))?;
                let fold = c.ignore_case() && V::KIND == ScalarKind::Text;
                let wanted_folded = wanted.as_text().map(str::to_lowercase);

                Ok(QueryFilter::new(move |item: &T| {
                    get(item).is_some_and(|values| {
                        values.iter().any(|v| {
                            let v = v.to_scalar();
                            match (fold, v.as_text(), wanted_folded.as_deref()) {
                                (true, Some(text), Some(folded)) => text.to_lowercase() == folded,
                                _ => v == wanted,
                            }
                        })
                    })
                }))
            }
            Target::Condition(c) => Err(FilterError::rehydration(
                target.full_path(prefix),
                format!(
                    "'{}' cannot be applied to a collection; only membership is supported",
                    c.operator()
                ),
            )),
        }
    }
}

fn has_elements<T: 'static, E: 'static>(
    get: for<'a> fn(&'a T) -> Option<&'a [E]>,
) -> QueryFilter<T> {
    QueryFilter::new(move |item: &T| get(item).is_some_and(|items| !items.is_empty()))
}
