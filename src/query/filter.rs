//! Executable filters
//!
//! `QueryFilter<T>` wraps a compiled predicate over `T`. It is immutable,
//! cheap to clone and safe to share between threads.

use std::borrow::Borrow;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::filter::{FilterError, FilterResult};

type PredicateFn<T> = dyn Fn(&T) -> bool + Send + Sync;

/// A ready-to-run predicate over elements of type `T`
pub struct QueryFilter<T> {
    predicate: Arc<PredicateFn<T>>,
}

impl<T> Clone for QueryFilter<T> {
    fn clone(&self) -> Self {
        Self {
            predicate: Arc::clone(&self.predicate),
        }
    }
}

impl<T> fmt::Debug for QueryFilter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryFilter")
            .field("element", &std::any::type_name::<T>())
            .finish()
    }
}

impl<T: 'static> QueryFilter<T> {
    pub fn new(predicate: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        Self {
            predicate: Arc::new(predicate),
        }
    }

    /// Matches every element
    pub fn always() -> Self {
        Self::new(|_| true)
    }

    /// Matches nothing
    pub fn never() -> Self {
        Self::new(|_| false)
    }

    pub fn matches(&self, item: &T) -> bool {
        (self.predicate)(item)
    }

    pub fn and(&self, other: &QueryFilter<T>) -> Self {
        let (a, b) = (self.clone(), other.clone());
        Self::new(move |item| a.matches(item) && b.matches(item))
    }

    pub fn or(&self, other: &QueryFilter<T>) -> Self {
        let (a, b) = (self.clone(), other.clone());
        Self::new(move |item| a.matches(item) || b.matches(item))
    }

    pub fn not(&self) -> Self {
        let inner = self.clone();
        Self::new(move |item| !inner.matches(item))
    }

    /// Lazily filter a sequence
    pub fn apply<I>(&self, seq: I) -> impl Iterator<Item = I::Item>
    where
        I: IntoIterator,
        I::Item: Borrow<T>,
    {
        let filter = self.clone();
        seq.into_iter().filter(move |item| filter.matches(item.borrow()))
    }

    /// Lazily filter a sequence, stopping with `FilterError::Canceled` once `cancel` fires
    pub fn apply_cancellable<I>(&self, seq: I, cancel: CancellationToken) -> Cancellable<I::IntoIter, T>
    where
        I: IntoIterator,
        I::Item: Borrow<T>,
    {
        Cancellable {
            inner: seq.into_iter(),
            filter: self.clone(),
            cancel,
            finished: false,
            _element: PhantomData,
        }
    }

    /// Adapt a closure over a projection of `T`
    pub fn on<U: 'static>(
        &self,
        project: impl Fn(&U) -> Option<&T> + Send + Sync + 'static,
    ) -> QueryFilter<U> {
        let inner = self.clone();
        QueryFilter::new(move |outer| project(outer).is_some_and(|item| inner.matches(item)))
    }
}

/// Iterator returned by [`QueryFilter::apply_cancellable`]
pub struct Cancellable<I, T> {
    inner: I,
    filter: QueryFilter<T>,
    cancel: CancellationToken,
    finished: bool,
    _element: PhantomData<fn(&T)>,
}

impl<I, T> Iterator for Cancellable<I, T>
where
    I: Iterator,
    I::Item: Borrow<T>,
    T: 'static,
{
    type Item = FilterResult<I::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        loop {
            if self.cancel.is_cancelled() {
                self.finished = true;
                return Some(Err(FilterError::Canceled));
            }
            let item = self.inner.next()?;
            if self.filter.matches(item.borrow()) {
                return Some(Ok(item));
            }
        }
    }
}

/// Iterator returned by [`FilterIteratorExt::filter_by`]
pub struct FilterBy<I, T> {
    inner: I,
    filter: QueryFilter<T>,
}

impl<I, T> Iterator for FilterBy<I, T>
where
    I: Iterator,
    I::Item: Borrow<T>,
    T: 'static,
{
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        let filter = &self.filter;
        self.inner.find(|item| filter.matches(item.borrow()))
    }
}

/// Filtering for iterator chains
pub trait FilterIteratorExt: Iterator + Sized {
    fn filter_by<T>(self, filter: &QueryFilter<T>) -> FilterBy<Self, T>
    where
        T: 'static,
        Self::Item: Borrow<T>,
    {
        FilterBy {
            inner: self,
            filter: filter.clone(),
        }
    }
}

impl<I: Iterator> FilterIteratorExt for I {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combinators() {
        let even = QueryFilter::new(|n: &i32| n % 2 == 0);
        let big = QueryFilter::new(|n: &i32| *n > 10);

        assert!(even.and(&big).matches(&12));
        assert!(!even.and(&big).matches(&8));
        assert!(even.or(&big).matches(&11));
        assert!(even.not().matches(&3));
        assert!(QueryFilter::<i32>::always().matches(&0));
        assert!(!QueryFilter::<i32>::never().matches(&0));
    }

    #[test]
    fn test_apply_is_lazy_and_borrows() {
        let even = QueryFilter::new(|n: &i32| n % 2 == 0);
        let numbers = vec![1, 2, 3, 4];

        let by_ref: Vec<&i32> = even.apply(&numbers).collect();
        assert_eq!(by_ref, vec![&2, &4]);

        let owned: Vec<i32> = even.apply(numbers).collect();
        assert_eq!(owned, vec![2, 4]);

        let first = even.apply(1..).next();
        assert_eq!(first, Some(2));
    }

    #[test]
    fn test_apply_cancellable() {
        let token = CancellationToken::new();
        let all = QueryFilter::<i32>::always();
        let mut iter = all.apply_cancellable(1..=5, token.clone());

        assert_eq!(iter.next().unwrap().unwrap(), 1);
        token.cancel();
        assert!(matches!(iter.next(), Some(Err(FilterError::Canceled))));
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_filter_by_and_projection() {
        let positive = QueryFilter::new(|n: &i32| *n > 0);
        let kept: Vec<i32> = vec![-1, 2, 3].into_iter().filter_by(&positive).collect();
        assert_eq!(kept, vec![2, 3]);

        let on_first = positive.on(|pair: &(i32, i32)| Some(&pair.0));
        assert!(on_first.matches(&(1, -1)));
        assert!(!on_first.matches(&(-1, 1)));
    }
}
