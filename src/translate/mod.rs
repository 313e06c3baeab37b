//! # Predicate Translation
//!
//! Native predicate expressions and their translation into portable
//! filter trees.

pub mod expr;
pub mod translator;

pub use expr::{lit, member, not, ArithmeticOp, CompareOp, Expr, Method};
pub use translator::{translate, Translator};
