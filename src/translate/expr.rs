//! Native predicate expressions
//!
//! Rust closures cannot be inspected, so predicates that must cross the
//! wire are written with this builder instead:
//!
//! ```
//! use aerofilter::translate::{lit, member};
//!
//! let adults_named_ann = member("age").ge(18)
//!     .and(member("name").starts_with_ignore_case("ann"));
//! let big_spender = member("orders").any(member("total").gt(1000));
//! let flipped = lit(18).lt(member("age"));
//! ```
//!
//! The builder accepts shapes the filter tree cannot express (arithmetic,
//! arbitrary method calls); the translator rejects those.

use std::fmt;
use std::ops;

use crate::filter::{Scalar, ScalarValue};

/// Comparison operators of a native predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl CompareOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl ArithmeticOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            ArithmeticOp::Add => "+",
            ArithmeticOp::Sub => "-",
            ArithmeticOp::Mul => "*",
            ArithmeticOp::Div => "/",
        }
    }
}

/// Method calls on a member
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    /// Substring test on text, membership test on a collection
    Contains { ignore_case: bool },
    StartsWith { ignore_case: bool },
    EndsWith { ignore_case: bool },
    /// No argument: collection is non-empty. One argument: some element matches.
    Any,
    All,
    /// Anything else
    Named(String),
}

impl Method {
    pub fn name(&self) -> &str {
        match self {
            Method::Contains { .. } => "contains",
            Method::StartsWith { .. } => "starts_with",
            Method::EndsWith { .. } => "ends_with",
            Method::Any => "any",
            Method::All => "all",
            Method::Named(name) => name,
        }
    }
}

/// A native predicate expression over one element parameter.
///
/// Member paths are relative to the innermost element: inside
/// `member("orders").any(..)` they address fields of an order.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Member(String),
    Literal(Scalar<'static>),
    Compare {
        op: CompareOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Arithmetic {
        op: ArithmeticOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
    Call {
        target: Box<Expr>,
        method: Method,
        args: Vec<Expr>,
    },
}

/// Member access on the element (`x.address.city` is `member("address.city")`)
pub fn member(path: impl Into<String>) -> Expr {
    Expr::Member(path.into())
}

/// Constant value
pub fn lit<V: ScalarValue>(value: V) -> Expr {
    Expr::Literal(value.to_scalar().into_owned())
}

/// Logical negation
pub fn not(expr: Expr) -> Expr {
    Expr::Not(Box::new(expr))
}

impl<V: ScalarValue> From<V> for Expr {
    fn from(value: V) -> Self {
        lit(value)
    }
}

impl Expr {
    fn compare(self, op: CompareOp, rhs: impl Into<Expr>) -> Expr {
        Expr::Compare {
            op,
            lhs: Box::new(self),
            rhs: Box::new(rhs.into()),
        }
    }

    fn call(self, method: Method, args: Vec<Expr>) -> Expr {
        Expr::Call {
            target: Box::new(self),
            method,
            args,
        }
    }

    pub fn eq(self, rhs: impl Into<Expr>) -> Expr {
        self.compare(CompareOp::Eq, rhs)
    }

    pub fn ne(self, rhs: impl Into<Expr>) -> Expr {
        self.compare(CompareOp::Ne, rhs)
    }

    pub fn gt(self, rhs: impl Into<Expr>) -> Expr {
        self.compare(CompareOp::Gt, rhs)
    }

    pub fn ge(self, rhs: impl Into<Expr>) -> Expr {
        self.compare(CompareOp::Ge, rhs)
    }

    pub fn lt(self, rhs: impl Into<Expr>) -> Expr {
        self.compare(CompareOp::Lt, rhs)
    }

    pub fn le(self, rhs: impl Into<Expr>) -> Expr {
        self.compare(CompareOp::Le, rhs)
    }

    pub fn and(self, rhs: Expr) -> Expr {
        Expr::And(Box::new(self), Box::new(rhs))
    }

    pub fn or(self, rhs: Expr) -> Expr {
        Expr::Or(Box::new(self), Box::new(rhs))
    }

    pub fn contains(self, value: impl Into<Expr>) -> Expr {
        self.call(Method::Contains { ignore_case: false }, vec![value.into()])
    }

    pub fn contains_ignore_case(self, value: impl Into<Expr>) -> Expr {
        self.call(Method::Contains { ignore_case: true }, vec![value.into()])
    }

    pub fn starts_with(self, value: impl Into<Expr>) -> Expr {
        self.call(Method::StartsWith { ignore_case: false }, vec![value.into()])
    }

    pub fn starts_with_ignore_case(self, value: impl Into<Expr>) -> Expr {
        self.call(Method::StartsWith { ignore_case: true }, vec![value.into()])
    }

    pub fn ends_with(self, value: impl Into<Expr>) -> Expr {
        self.call(Method::EndsWith { ignore_case: false }, vec![value.into()])
    }

    pub fn ends_with_ignore_case(self, value: impl Into<Expr>) -> Expr {
        self.call(Method::EndsWith { ignore_case: true }, vec![value.into()])
    }

    /// Collection has at least one element
    pub fn has_any(self) -> Expr {
        self.call(Method::Any, vec![])
    }

    /// Some element satisfies `predicate`
    pub fn any(self, predicate: Expr) -> Expr {
        self.call(Method::Any, vec![predicate])
    }

    /// Every element satisfies `predicate`
    pub fn all(self, predicate: Expr) -> Expr {
        self.call(Method::All, vec![predicate])
    }

    /// Arbitrary method call
    pub fn method(self, name: impl Into<String>, args: Vec<Expr>) -> Expr {
        self.call(Method::Named(name.into()), args)
    }
}

impl ops::Not for Expr {
    type Output = Expr;

    fn not(self) -> Expr {
        not(self)
    }
}

macro_rules! arithmetic_op {
    ($trait:ident, $fn:ident, $op:expr) => {
        impl<R: Into<Expr>> ops::$trait<R> for Expr {
            type Output = Expr;

            fn $fn(self, rhs: R) -> Expr {
                Expr::Arithmetic {
                    op: $op,
                    lhs: Box::new(self),
                    rhs: Box::new(rhs.into()),
                }
            }
        }
    };
}

arithmetic_op!(Add, add, ArithmeticOp::Add);
arithmetic_op!(Sub, sub, ArithmeticOp::Sub);
arithmetic_op!(Mul, mul, ArithmeticOp::Mul);
arithmetic_op!(Div, div, ArithmeticOp::Div);

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Member(path) => write!(f, "x.{}", path),
            Expr::Literal(Scalar::Text(s)) => write!(f, "{:?}", s),
            Expr::Literal(v) => write!(f, "{}", v.to_literal()),
            Expr::Compare { op, lhs, rhs } => write!(f, "{} {} {}", lhs, op.symbol(), rhs),
            Expr::Arithmetic { op, lhs, rhs } => write!(f, "({} {} {})", lhs, op.symbol(), rhs),
            Expr::And(a, b) => write!(f, "({} && {})", a, b),
            Expr::Or(a, b) => write!(f, "({} || {})", a, b),
            Expr::Not(inner) => write!(f, "!({})", inner),
            Expr::Call {
                target,
                method,
                args,
            } => {
                write!(f, "{}.{}(", target, method.name())?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
        }
    }
}
