//! # Filter Tree
//!
//! The portable predicate representation. Trees are immutable: every
//! variant is built through a constructor that enforces its invariants
//! and only read afterwards.

use std::fmt;

use super::errors::{FilterError, FilterResult, ValidationDetails};

/// Operators of a condition node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConditionOperator {
    Equals,
    NotEquals,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    Contains,
    StartsWith,
    EndsWith,
}

impl ConditionOperator {
    pub const ALL: [ConditionOperator; 9] = [
        ConditionOperator::Equals,
        ConditionOperator::NotEquals,
        ConditionOperator::GreaterThan,
        ConditionOperator::GreaterThanOrEqual,
        ConditionOperator::LessThan,
        ConditionOperator::LessThanOrEqual,
        ConditionOperator::Contains,
        ConditionOperator::StartsWith,
        ConditionOperator::EndsWith,
    ];

    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionOperator::Equals => "equals",
            ConditionOperator::NotEquals => "notEquals",
            ConditionOperator::GreaterThan => "greaterThan",
            ConditionOperator::GreaterThanOrEqual => "greaterThanOrEqual",
            ConditionOperator::LessThan => "lessThan",
            ConditionOperator::LessThanOrEqual => "lessThanOrEqual",
            ConditionOperator::Contains => "contains",
            ConditionOperator::StartsWith => "startsWith",
            ConditionOperator::EndsWith => "endsWith",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.as_str() == name)
    }

    /// Short symbol for display
    pub fn symbol(&self) -> &'static str {
        match self {
            ConditionOperator::Equals => "==",
            ConditionOperator::NotEquals => "!=",
            ConditionOperator::GreaterThan => ">",
            ConditionOperator::GreaterThanOrEqual => ">=",
            ConditionOperator::LessThan => "<",
            ConditionOperator::LessThanOrEqual => "<=",
            ConditionOperator::Contains => "contains",
            ConditionOperator::StartsWith => "starts with",
            ConditionOperator::EndsWith => "ends with",
        }
    }

    /// Whether `ignore_case` applies
    pub fn is_string_match(&self) -> bool {
        matches!(
            self,
            ConditionOperator::Contains | ConditionOperator::StartsWith | ConditionOperator::EndsWith
        )
    }

    pub fn is_ordering(&self) -> bool {
        matches!(
            self,
            ConditionOperator::GreaterThan
                | ConditionOperator::GreaterThanOrEqual
                | ConditionOperator::LessThan
                | ConditionOperator::LessThanOrEqual
        )
    }

    /// Logical complement of a comparison (`>` becomes `<=`).
    ///
    /// String matches have no complement in the operator set.
    pub fn negate(&self) -> Option<Self> {
        match self {
            ConditionOperator::Equals => Some(ConditionOperator::NotEquals),
            ConditionOperator::NotEquals => Some(ConditionOperator::Equals),
            ConditionOperator::GreaterThan => Some(ConditionOperator::LessThanOrEqual),
            ConditionOperator::GreaterThanOrEqual => Some(ConditionOperator::LessThan),
            ConditionOperator::LessThan => Some(ConditionOperator::GreaterThanOrEqual),
            ConditionOperator::LessThanOrEqual => Some(ConditionOperator::GreaterThan),
            ConditionOperator::Contains
            | ConditionOperator::StartsWith
            | ConditionOperator::EndsWith => None,
        }
    }

    /// Same comparison with the operands swapped (`k < x` reads as `x > k`)
    pub fn flip(&self) -> Self {
        match self {
            ConditionOperator::GreaterThan => ConditionOperator::LessThan,
            ConditionOperator::GreaterThanOrEqual => ConditionOperator::LessThanOrEqual,
            ConditionOperator::LessThan => ConditionOperator::GreaterThan,
            ConditionOperator::LessThanOrEqual => ConditionOperator::GreaterThanOrEqual,
            other => *other,
        }
    }
}

impl fmt::Display for ConditionOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How group children combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Combination {
    And,
    Or,
}

impl Combination {
    pub fn as_str(&self) -> &'static str {
        match self {
            Combination::And => "and",
            Combination::Or => "or",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "and" => Some(Combination::And),
            "or" => Some(Combination::Or),
            _ => None,
        }
    }

    /// De Morgan dual
    pub fn dual(&self) -> Self {
        match self {
            Combination::And => Combination::Or,
            Combination::Or => Combination::And,
        }
    }
}

/// Collection quantifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionOperator {
    Any,
    All,
    HasElements,
}

impl CollectionOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionOperator::Any => "any",
            CollectionOperator::All => "all",
            CollectionOperator::HasElements => "hasElements",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "any" => Some(CollectionOperator::Any),
            "all" => Some(CollectionOperator::All),
            "hasElements" => Some(CollectionOperator::HasElements),
            _ => None,
        }
    }

    pub fn requires_predicate(&self) -> bool {
        !matches!(self, CollectionOperator::HasElements)
    }
}

/// Single member test: `path operator value`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Condition {
    path: String,
    operator: ConditionOperator,
    value: String,
    ignore_case: bool,
}

impl Condition {
    pub fn new(
        path: impl Into<String>,
        operator: ConditionOperator,
        value: impl Into<String>,
    ) -> FilterResult<Self> {
        let path = path.into();
        if path.is_empty() {
            return Err(ValidationDetails::empty_property("property").into());
        }
        Ok(Self {
            path,
            operator,
            value: value.into(),
            ignore_case: false,
        })
    }

    /// Copy of this condition with case folding switched on or off
    pub fn with_ignore_case(mut self, ignore_case: bool) -> Self {
        self.ignore_case = ignore_case;
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn operator(&self) -> ConditionOperator {
        self.operator
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn ignore_case(&self) -> bool {
        self.ignore_case
    }
}

/// Ordered, non-empty combination of nodes
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Group {
    combination: Combination,
    children: Vec<FilterNode>,
}

impl Group {
    pub fn new(combination: Combination, children: Vec<FilterNode>) -> FilterResult<Self> {
        if children.is_empty() {
            return Err(ValidationDetails::empty_group("children").into());
        }
        Ok(Self {
            combination,
            children,
        })
    }

    /// Two-child group; cannot be empty
    pub fn pair(combination: Combination, left: FilterNode, right: FilterNode) -> Self {
        Self {
            combination,
            children: vec![left, right],
        }
    }

    pub fn combination(&self) -> Combination {
        self.combination
    }

    pub fn children(&self) -> &[FilterNode] {
        &self.children
    }
}

/// Quantified test over a collection member
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionCondition {
    path: String,
    operator: CollectionOperator,
    predicate: Option<Box<FilterNode>>,
}

impl CollectionCondition {
    fn build(
        path: String,
        operator: CollectionOperator,
        predicate: Option<FilterNode>,
    ) -> FilterResult<Self> {
        if path.is_empty() {
            return Err(ValidationDetails::empty_property("property").into());
        }
        Ok(Self {
            path,
            operator,
            predicate: predicate.map(Box::new),
        })
    }

    /// At least one element satisfies `predicate`
    pub fn any(path: impl Into<String>, predicate: FilterNode) -> FilterResult<Self> {
        Self::build(path.into(), CollectionOperator::Any, Some(predicate))
    }

    /// Every element satisfies `predicate`
    pub fn all(path: impl Into<String>, predicate: FilterNode) -> FilterResult<Self> {
        Self::build(path.into(), CollectionOperator::All, Some(predicate))
    }

    /// The collection is non-empty
    pub fn has_elements(path: impl Into<String>) -> FilterResult<Self> {
        Self::build(path.into(), CollectionOperator::HasElements, None)
    }

    /// Build from an operator; the predicate is required for any/all and dropped for has-elements
    pub fn with_operator(
        path: impl Into<String>,
        operator: CollectionOperator,
        predicate: Option<FilterNode>,
    ) -> FilterResult<Self> {
        match (operator, predicate) {
            (CollectionOperator::HasElements, _) => Self::has_elements(path),
            (op, Some(p)) => Self::build(path.into(), op, Some(p)),
            (_, None) => Err(FilterError::Validation(ValidationDetails::missing_field(
                "predicate",
            ))),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn operator(&self) -> CollectionOperator {
        self.operator
    }

    pub fn predicate(&self) -> Option<&FilterNode> {
        self.predicate.as_deref()
    }
}

/// A node of the filter tree
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FilterNode {
    Condition(Condition),
    Group(Group),
    Collection(CollectionCondition),
}

impl FilterNode {
    /// Condition node shorthand
    pub fn condition(
        path: impl Into<String>,
        operator: ConditionOperator,
        value: impl Into<String>,
    ) -> FilterResult<Self> {
        Condition::new(path, operator, value).map(FilterNode::Condition)
    }

    pub fn group(combination: Combination, children: Vec<FilterNode>) -> FilterResult<Self> {
        Group::new(combination, children).map(FilterNode::Group)
    }

    pub fn and(self, other: FilterNode) -> Self {
        FilterNode::Group(Group::pair(Combination::And, self, other))
    }

    pub fn or(self, other: FilterNode) -> Self {
        FilterNode::Group(Group::pair(Combination::Or, self, other))
    }

    /// Nesting depth (a single condition has depth 1)
    pub fn depth(&self) -> usize {
        match self {
            FilterNode::Condition(_) => 1,
            FilterNode::Group(g) => 1 + g.children.iter().map(FilterNode::depth).max().unwrap_or(0),
            FilterNode::Collection(c) => 1 + c.predicate().map_or(0, FilterNode::depth),
        }
    }
}

impl From<Condition> for FilterNode {
    fn from(c: Condition) -> Self {
        FilterNode::Condition(c)
    }
}

impl From<Group> for FilterNode {
    fn from(g: Group) -> Self {
        FilterNode::Group(g)
    }
}

impl From<CollectionCondition> for FilterNode {
    fn from(c: CollectionCondition) -> Self {
        FilterNode::Collection(c)
    }
}

impl fmt::Display for FilterNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterNode::Condition(c) => {
                write!(f, "{} {} {:?}", c.path, c.operator.symbol(), c.value)?;
                if c.ignore_case && c.operator.is_string_match() {
                    write!(f, " (ignore case)")?;
                }
                Ok(())
            }
            FilterNode::Group(g) => {
                let sep = match g.combination {
                    Combination::And => " AND ",
                    Combination::Or => " OR ",
                };
                write!(f, "(")?;
                for (i, child) in g.children.iter().enumerate() {
                    if i > 0 {
                        f.write_str(sep)?;
                    }
                    write!(f, "{}", child)?;
                }
                write!(f, ")")
            }
            FilterNode::Collection(c) => match c.predicate() {
                Some(p) => write!(f, "{}.{}({})", c.path, c.operator.as_str(), p),
                None => write!(f, "{}.{}()", c.path, c.operator.as_str()),
            },
        }
    }
}
