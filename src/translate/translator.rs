//! Predicate translator
//!
//! Turns a native predicate expression into a filter tree:
//! - `x.a > k` becomes a condition; `k < x.a` is flipped to `x.a > k`
//! - `&&` / `||` become two-child groups
//! - negation is pushed down: `!(x.a > k)` becomes `x.a <= k`, compound
//!   negation expands by De Morgan, `!any(p)` becomes `all(!p)`
//! - string matches and quantifiers on members map one to one
//!
//! Anything else fails. Nothing is approximated.

use tracing::trace;

use crate::filter::{
    CollectionCondition, Combination, Condition, ConditionOperator, FilterError, FilterNode,
    FilterResult, Group, Scalar,
};

use super::expr::{CompareOp, Expr, Method};

impl From<CompareOp> for ConditionOperator {
    fn from(op: CompareOp) -> Self {
        match op {
            CompareOp::Eq => ConditionOperator::Equals,
            CompareOp::Ne => ConditionOperator::NotEquals,
            CompareOp::Gt => ConditionOperator::GreaterThan,
            CompareOp::Ge => ConditionOperator::GreaterThanOrEqual,
            CompareOp::Lt => ConditionOperator::LessThan,
            CompareOp::Le => ConditionOperator::LessThanOrEqual,
        }
    }
}

/// Translate with default settings
pub fn translate(expr: &Expr) -> FilterResult<FilterNode> {
    Translator::new().translate(expr)
}

/// Converts native predicate expressions into filter trees.
///
/// Stateless; one instance can serve any number of threads.
#[derive(Debug, Clone, Default)]
pub struct Translator;

impl Translator {
    pub fn new() -> Self {
        Self
    }

    /// # Errors
    ///
    /// Returns `FilterError::Translation` for any unsupported shape.
    pub fn translate(&self, expr: &Expr) -> FilterResult<FilterNode> {
        let node = self.node(expr, false)?;
        trace!(predicate = %expr, filter = %node, "Translated predicate");
        Ok(node)
    }

    /// Translate `expr`, or its negation when `negated` is set
    fn node(&self, expr: &Expr, negated: bool) -> FilterResult<FilterNode> {
        match expr {
            Expr::Not(inner) => self.node(inner, !negated),

            Expr::And(lhs, rhs) => self.group(Combination::And, lhs, rhs, negated),
            Expr::Or(lhs, rhs) => self.group(Combination::Or, lhs, rhs, negated),

            Expr::Compare { op, lhs, rhs } => self.comparison(*op, lhs, rhs, negated),

            // A bare boolean member reads as `member == true`
            Expr::Member(path) => condition(
                path,
                ConditionOperator::Equals,
                if negated { "false" } else { "true" },
            ),

            Expr::Call {
                target,
                method,
                args,
            } => self.call(target, method, args, negated),

            Expr::Literal(_) => Err(unsupported("constant predicate", expr)),
            Expr::Arithmetic { .. } => Err(unsupported("arithmetic is not a predicate", expr)),
        }
    }

    fn group(
        &self,
        combination: Combination,
        lhs: &Expr,
        rhs: &Expr,
        negated: bool,
    ) -> FilterResult<FilterNode> {
        let combination = if negated {
            combination.dual()
        } else {
            combination
        };
        let left = self.node(lhs, negated)?;
        let right = self.node(rhs, negated)?;
        Ok(FilterNode::Group(Group::pair(combination, left, right)))
    }

    fn comparison(
        &self,
        op: CompareOp,
        lhs: &Expr,
        rhs: &Expr,
        negated: bool,
    ) -> FilterResult<FilterNode> {
        let (path, literal, operator) = match (lhs, rhs) {
            (Expr::Member(path), Expr::Literal(value)) => (path, value, ConditionOperator::from(op)),
            (Expr::Literal(value), Expr::Member(path)) => {
                (path, value, ConditionOperator::from(op).flip())
            }
            _ => {
                let expr = Expr::Compare {
                    op,
                    lhs: Box::new(lhs.clone()),
                    rhs: Box::new(rhs.clone()),
                };
                return Err(unsupported(
                    "comparison needs one member and one literal",
                    &expr,
                ));
            }
        };

        let operator = if negated {
            // comparison operators always have a complement
            operator.negate().unwrap_or(operator)
        } else {
            operator
        };
        condition(path, operator, &literal_text(literal))
    }

    fn call(
        &self,
        target: &Expr,
        method: &Method,
        args: &[Expr],
        negated: bool,
    ) -> FilterResult<FilterNode> {
        let describe = || Expr::Call {
            target: Box::new(target.clone()),
            method: method.clone(),
            args: args.to_vec(),
        };

        let path = match target {
            Expr::Member(path) => path,
            _ => return Err(unsupported("method target must be a member", &describe())),
        };

        match method {
            Method::Contains { ignore_case }
            | Method::StartsWith { ignore_case }
            | Method::EndsWith { ignore_case } => {
                if negated {
                    return Err(unsupported("negated string match", &describe()));
                }
                let literal = match args {
                    [Expr::Literal(value)] => value,
                    _ => {
                        return Err(unsupported(
                            "string match takes exactly one literal",
                            &describe(),
                        ))
                    }
                };
                let operator = match method {
                    Method::Contains { .. } => ConditionOperator::Contains,
                    Method::StartsWith { .. } => ConditionOperator::StartsWith,
                    _ => ConditionOperator::EndsWith,
                };
                let condition = Condition::new(path.as_str(), operator, literal_text(literal))
                    .map_err(|e| FilterError::translation(e.to_string()))?
                    .with_ignore_case(*ignore_case);
                Ok(FilterNode::Condition(condition))
            }

            Method::Any => match args {
                [] if negated => Err(unsupported(
                    "negated has-elements has no filter equivalent",
                    &describe(),
                )),
                [] => collection(CollectionCondition::has_elements(path.as_str())),
                // !any(p) == all(!p)
                [inner] if negated => {
                    let predicate = self.node(inner, true)?;
                    collection(CollectionCondition::all(path.as_str(), predicate))
                }
                [inner] => {
                    let predicate = self.node(inner, false)?;
                    collection(CollectionCondition::any(path.as_str(), predicate))
                }
                _ => Err(unsupported("any takes at most one predicate", &describe())),
            },

            Method::All => match args {
                // !all(p) == any(!p)
                [inner] if negated => {
                    let predicate = self.node(inner, true)?;
                    collection(CollectionCondition::any(path.as_str(), predicate))
                }
                [inner] => {
                    let predicate = self.node(inner, false)?;
                    collection(CollectionCondition::all(path.as_str(), predicate))
                }
                _ => Err(unsupported("all takes exactly one predicate", &describe())),
            },

            Method::Named(_) => Err(unsupported("unsupported method call", &describe())),
        }
    }
}

fn condition(path: &str, operator: ConditionOperator, value: &str) -> FilterResult<FilterNode> {
    FilterNode::condition(path, operator, value)
        .map_err(|e| FilterError::translation(e.to_string()))
}

fn collection(built: FilterResult<CollectionCondition>) -> FilterResult<FilterNode> {
    built
        .map(FilterNode::Collection)
        .map_err(|e| FilterError::translation(e.to_string()))
}

fn literal_text(value: &Scalar<'static>) -> String {
    value.to_literal()
}

fn unsupported(reason: &str, expr: &Expr) -> FilterError {
    FilterError::translation(format!("{}: {}", reason, expr))
}
