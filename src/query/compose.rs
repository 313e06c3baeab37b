//! Filter composition
//!
//! Combinators and string-match builders that work on executable
//! filters directly, without a tree in between.
//!
//! String builders treat a missing, empty or whitespace-only search term
//! as "no filter": they return an always-true filter so callers need no
//! guard for an empty search box.

use std::borrow::Borrow;

use super::filter::QueryFilter;

/// Kind of text match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextMatch {
    Contains,
    StartsWith,
    EndsWith,
}

impl TextMatch {
    /// Test `haystack` against a needle that is already case-folded when `ignore_case` is set
    pub(crate) fn test(&self, haystack: &str, needle: &str, ignore_case: bool) -> bool {
        if ignore_case {
            let folded = haystack.to_lowercase();
            self.test_exact(&folded, needle)
        } else {
            self.test_exact(haystack, needle)
        }
    }

    fn test_exact(&self, haystack: &str, needle: &str) -> bool {
        match self {
            TextMatch::Contains => haystack.contains(needle),
            TextMatch::StartsWith => haystack.starts_with(needle),
            TextMatch::EndsWith => haystack.ends_with(needle),
        }
    }
}

pub fn and<T: 'static>(a: &QueryFilter<T>, b: &QueryFilter<T>) -> QueryFilter<T> {
    a.and(b)
}

pub fn or<T: 'static>(a: &QueryFilter<T>, b: &QueryFilter<T>) -> QueryFilter<T> {
    a.or(b)
}

pub fn not<T: 'static>(a: &QueryFilter<T>) -> QueryFilter<T> {
    a.not()
}

/// Left-fold filters with AND (`use_and`) or OR.
///
/// An empty sequence yields the always-true filter.
pub fn join<T, I>(filters: I, use_and: bool) -> QueryFilter<T>
where
    T: 'static,
    I: IntoIterator,
    I::Item: Borrow<QueryFilter<T>>,
{
    let mut iter = filters.into_iter();
    let first = match iter.next() {
        Some(f) => f.borrow().clone(),
        None => return QueryFilter::always(),
    };
    iter.fold(first, |acc, f| {
        if use_and {
            acc.and(f.borrow())
        } else {
            acc.or(f.borrow())
        }
    })
}

/// Text match builder shared by the public helpers
pub fn text_match<T, S>(
    selector: S,
    kind: TextMatch,
    candidate: Option<&str>,
    ignore_case: bool,
) -> QueryFilter<T>
where
    T: 'static,
    S: Fn(&T) -> Option<&str> + Send + Sync + 'static,
{
    let needle = match candidate {
        Some(c) if !c.trim().is_empty() => c,
        _ => return QueryFilter::always(),
    };
    let needle = if ignore_case {
        needle.to_lowercase()
    } else {
        needle.to_string()
    };

    QueryFilter::new(move |item| match selector(item) {
        Some(value) => kind.test(value, &needle, ignore_case),
        None => false,
    })
}

pub fn contains<T: 'static>(
    selector: impl Fn(&T) -> Option<&str> + Send + Sync + 'static,
    candidate: Option<&str>,
) -> QueryFilter<T> {
    text_match(selector, TextMatch::Contains, candidate, false)
}

pub fn contains_ignore_case<T: 'static>(
    selector: impl Fn(&T) -> Option<&str> + Send + Sync + 'static,
    candidate: Option<&str>,
) -> QueryFilter<T> {
    text_match(selector, TextMatch::Contains, candidate, true)
}

pub fn starts_with<T: 'static>(
    selector: impl Fn(&T) -> Option<&str> + Send + Sync + 'static,
    candidate: Option<&str>,
) -> QueryFilter<T> {
    text_match(selector, TextMatch::StartsWith, candidate, false)
}

pub fn starts_with_ignore_case<T: 'static>(
    selector: impl Fn(&T) -> Option<&str> + Send + Sync + 'static,
    candidate: Option<&str>,
) -> QueryFilter<T> {
    text_match(selector, TextMatch::StartsWith, candidate, true)
}

pub fn ends_with<T: 'static>(
    selector: impl Fn(&T) -> Option<&str> + Send + Sync + 'static,
    candidate: Option<&str>,
) -> QueryFilter<T> {
    text_match(selector, TextMatch::EndsWith, candidate, false)
}

pub fn ends_with_ignore_case<T: 'static>(
    selector: impl Fn(&T) -> Option<&str> + Send + Sync + 'static,
    candidate: Option<&str>,
) -> QueryFilter<T> {
    text_match(selector, TextMatch::EndsWith, candidate, true)
}

/// Lazily filter `seq`
pub fn apply<T, I>(seq: I, filter: &QueryFilter<T>) -> impl Iterator<Item = I::Item>
where
    T: 'static,
    I: IntoIterator,
    I::Item: Borrow<T>,
{
    filter.apply(seq)
}

/// Apply every present filter in order (AND semantics); `None` entries are skipped
pub fn apply_all<T, I, F>(seq: I, filters: F) -> impl Iterator<Item = I::Item>
where
    T: 'static,
    I: IntoIterator,
    I::Item: Borrow<T>,
    F: IntoIterator<Item = Option<QueryFilter<T>>>,
{
    let active: Vec<QueryFilter<T>> = filters.into_iter().flatten().collect();
    seq.into_iter()
        .filter(move |item| active.iter().all(|f| f.matches(item.borrow())))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Person {
        name: Option<String>,
        age: u32,
    }

    fn person(name: Option<&str>, age: u32) -> Person {
        Person {
            name: name.map(str::to_string),
            age,
        }
    }

    fn people() -> Vec<Person> {
        vec![
            person(Some("Ann"), 30),
            person(Some("bob"), 17),
            person(None, 45),
            person(Some("Annika"), 12),
        ]
    }

    fn names<'a>(seq: impl Iterator<Item = &'a Person>) -> Vec<Option<&'a str>> {
        seq.map(|p| p.name.as_deref()).collect()
    }

    #[test]
    fn test_join_empty_is_identity() {
        let none: Vec<QueryFilter<Person>> = vec![];
        let all = join(none, true);
        assert_eq!(apply(&people(), &all).count(), 4);
        let none: Vec<QueryFilter<Person>> = vec![];
        assert_eq!(apply(&people(), &join(none, false)).count(), 4);
    }

    #[test]
    fn test_join_and_or() {
        let adult = QueryFilter::new(|p: &Person| p.age >= 18);
        let named_ann = starts_with(|p: &Person| p.name.as_deref(), Some("Ann"));

        let data = people();
        let both = join([adult.clone(), named_ann.clone()], true);
        assert_eq!(names(apply(&data, &both)), vec![Some("Ann")]);

        let either = join(vec![adult, named_ann], false);
        assert_eq!(apply(&data, &either).count(), 3);
    }

    #[test]
    fn test_blank_candidate_opts_out() {
        let data = people();
        for candidate in [None, Some(""), Some("   ")] {
            let f = contains(|p: &Person| p.name.as_deref(), candidate);
            assert_eq!(apply(&data, &f).count(), 4);
        }
    }

    #[test]
    fn test_ignore_case_and_null_members() {
        let data = people();
        let f = contains_ignore_case(|p: &Person| p.name.as_deref(), Some("ANN"));
        assert_eq!(names(apply(&data, &f)), vec![Some("Ann"), Some("Annika")]);

        let f = ends_with_ignore_case(|p: &Person| p.name.as_deref(), Some("OB"));
        assert_eq!(names(apply(&data, &f)), vec![Some("bob")]);

        // case-sensitive variant does not match "bob"
        let f = starts_with(|p: &Person| p.name.as_deref(), Some("B"));
        assert_eq!(apply(&data, &f).count(), 0);
    }

    #[test]
    fn test_apply_all_skips_none_and_is_idempotent() {
        let data = people();
        let filters = || {
            vec![
                Some(QueryFilter::new(|p: &Person| p.age > 15)),
                None,
                Some(contains(|p: &Person| p.name.as_deref(), Some("b"))),
            ]
        };
        let first = names(apply_all(&data, filters()));
        let second = names(apply_all(&data, filters()));
        assert_eq!(first, vec![Some("bob")]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_not_and_or_helpers() {
        let young = QueryFilter::new(|p: &Person| p.age < 18);
        let data = people();
        assert_eq!(apply(&data, &not(&young)).count(), 2);
        assert_eq!(apply(&data, &and(&young, &not(&young))).count(), 0);
        assert_eq!(apply(&data, &or(&young, &not(&young))).count(), 4);
    }
}
