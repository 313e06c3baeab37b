//! Compiles filter trees into executable filters

use std::any::type_name;
use std::cmp::Ordering;

use tracing::debug;

use crate::filter::{
    Combination, Condition, ConditionOperator, FilterError, FilterNode, FilterResult, Scalar,
    ScalarKind,
};
use crate::query::{join, QueryFilter, TextMatch};

use super::member::{Filterable, Member, ScalarMember, Target};

/// Rehydrate with default settings
pub fn rehydrate<T: Filterable>(node: &FilterNode) -> FilterResult<QueryFilter<T>> {
    Rehydrator::new().rehydrate(node)
}

/// Turns validated filter trees back into `QueryFilter`s
#[derive(Debug, Clone, Default)]
pub struct Rehydrator;

impl Rehydrator {
    pub fn new() -> Self {
        Self
    }

    /// # Errors
    ///
    /// Returns `FilterError::Rehydration` when a path does not resolve on `T`,
    /// an operator does not apply to the member it names, or a literal does
    /// not parse as the member's type.
    pub fn rehydrate<T: Filterable>(&self, node: &FilterNode) -> FilterResult<QueryFilter<T>> {
        let filter = compile::<T>(node, "")?;
        debug!(element = type_name::<T>(), filter = %node, "Rehydrated filter");
        Ok(filter)
    }
}

/// Compile `node` against `T`; `prefix` locates the node inside enclosing collections
pub(crate) fn compile<T: Filterable>(node: &FilterNode, prefix: &str) -> FilterResult<QueryFilter<T>> {
    match node {
        FilterNode::Condition(c) => resolve::<T>(c.path(), Target::Condition(c), prefix),
        FilterNode::Collection(c) => resolve::<T>(c.path(), Target::Collection(c), prefix),
        FilterNode::Group(g) => {
            let children = g
                .children()
                .iter()
                .map(|child| compile::<T>(child, prefix))
                .collect::<FilterResult<Vec<_>>>()?;
            Ok(join(children, g.combination() == Combination::And))
        }
    }
}

/// Walk the dotted `path` on `T` one segment at a time
pub(crate) fn resolve<T: Filterable>(
    path: &str,
    target: Target<'_>,
    prefix: &str,
) -> FilterResult<QueryFilter<T>> {
    let (head, rest) = match path.split_once('.') {
        Some((head, rest)) => (head, Some(rest)),
        None => (path, None),
    };

    let member = T::member(head).ok_or_else(|| {
        FilterError::rehydration(
            target.full_path(prefix),
            format!("{} has no member '{}'", short_name::<T>(), head),
        )
    })?;

    match (member, rest) {
        (Member::Nested(nested), Some(rest)) => nested.compile(rest, target, prefix),
        (other, Some(_)) => Err(FilterError::rehydration(
            target.full_path(prefix),
            format!("'{}' is {} and has no members", head, other.describe()),
        )),
        (Member::Scalar(scalar), None) => match target {
            Target::Condition(c) => scalar_condition(&scalar, c, &target.full_path(prefix)),
            Target::Collection(c) => Err(FilterError::rehydration(
                target.full_path(prefix),
                format!("'{}' needs a collection, found a scalar", c.operator().as_str()),
            )),
        },
        (Member::Items(items), None) | (Member::Values(items), None) => {
            items.compile(target, prefix)
        }
        (Member::Nested(_), None) => Err(FilterError::rehydration(
            target.full_path(prefix),
            format!("'{}' is an object; address one of its members", head),
        )),
    }
}

fn scalar_condition<T: 'static>(
    member: &ScalarMember<T>,
    condition: &Condition,
    path: &str,
) -> FilterResult<QueryFilter<T>> {
    let operator = condition.operator();
    let kind = member.kind();

    if operator.is_string_match() {
        if kind != ScalarKind::Text {
            return Err(FilterError::rehydration(
                path,
                format!("'{}' needs a text member, found {}", operator, kind),
            ));
        }
        let ignore_case = condition.ignore_case();
        let needle = if ignore_case {
            condition.value().to_lowercase()
        } else {
            condition.value().to_string()
        };
        let matcher = match operator {
            ConditionOperator::Contains => TextMatch::Contains,
            ConditionOperator::StartsWith => TextMatch::StartsWith,
            _ => TextMatch::EndsWith,
        };
        let member = member.clone();
        return Ok(QueryFilter::new(move |item: &T| {
            match member.read(item).as_ref().and_then(Scalar::as_text) {
                Some(text) => matcher.test(text, &needle, ignore_case),
                None => false,
            }
        }));
    }

    if operator.is_ordering() && !kind.is_ordered() {
        return Err(FilterError::rehydration(
            path,
            format!("'{}' cannot order {} values", operator, kind),
        ));
    }

    let expected =
        Scalar::parse(kind, condition.value()).map_err(|reason| FilterError::rehydration(path, reason))?;
    let member = member.clone();
    Ok(QueryFilter::new(move |item: &T| match member.read(item) {
        Some(actual) => satisfies(operator, actual.compare(&expected)),
        None => operator == ConditionOperator::NotEquals,
    }))
}

/// Whether `actual <op> expected` holds for the given ordering
fn satisfies(operator: ConditionOperator, ordering: Option<Ordering>) -> bool {
    use Ordering::*;
    match operator {
        ConditionOperator::Equals => ordering == Some(Equal),
        ConditionOperator::NotEquals => ordering != Some(Equal),
        ConditionOperator::GreaterThan => ordering == Some(Greater),
        ConditionOperator::GreaterThanOrEqual => matches!(ordering, Some(Greater | Equal)),
        ConditionOperator::LessThan => ordering == Some(Less),
        ConditionOperator::LessThanOrEqual => matches!(ordering, Some(Less | Equal)),
        ConditionOperator::Contains
        | ConditionOperator::StartsWith
        | ConditionOperator::EndsWith => false,
    }
}

fn short_name<T>() -> &'static str {
    let full = type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}
