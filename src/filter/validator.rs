//! Wire filter validator
//!
//! Validation semantics:
//! - Every node is an object carrying a known `operator`
//! - Conditions and collection conditions carry a non-empty `property`
//! - Conditions carry a string `value`
//! - `ignoreCase`, when present, is a boolean
//! - Groups carry a non-empty `children` array
//! - `any` / `all` carry a nested `predicate`
//!
//! Forbidden behaviors:
//! - Implicit type coercion (`"true"` is not a boolean)
//! - Default values
//! - Partial validation (the whole tree is accepted or rejected)

use serde_json::{Map, Value};

use super::errors::{FilterResult, ValidationDetails};
use super::node::{CollectionOperator, Combination, ConditionOperator};

/// Default cap on tree nesting
pub const MAX_FILTER_DEPTH: usize = 64;

/// Checks a raw wire tree before it is trusted.
///
/// The validator does not mutate the payload and is deterministic.
#[derive(Debug, Clone)]
pub struct FilterValidator {
    max_depth: usize,
}

impl Default for FilterValidator {
    fn default() -> Self {
        Self {
            max_depth: MAX_FILTER_DEPTH,
        }
    }
}

impl FilterValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Validates a whole tree.
    ///
    /// # Errors
    ///
    /// Returns `FilterError::Validation` naming the first offending field.
    pub fn validate(&self, payload: &Value) -> FilterResult<()> {
        self.validate_node(payload, "$", 1)
    }

    fn validate_node(&self, value: &Value, path: &str, depth: usize) -> FilterResult<()> {
        if depth > self.max_depth {
            return Err(ValidationDetails::new(
                path,
                format!("nesting depth of at most {}", self.max_depth),
                format!("depth {}", depth),
            )
            .into());
        }

        let obj = value.as_object().ok_or_else(|| {
            ValidationDetails::type_mismatch(path, "object", json_type_name(value))
        })?;

        let operator_path = make_path(path, "operator");
        let operator = match obj.get("operator") {
            Some(Value::String(s)) => s.as_str(),
            Some(other) => {
                return Err(ValidationDetails::type_mismatch(
                    operator_path,
                    "string",
                    json_type_name(other),
                )
                .into())
            }
            None => return Err(ValidationDetails::missing_field(operator_path).into()),
        };

        if ConditionOperator::from_name(operator).is_some() {
            self.validate_condition(obj, path)
        } else if Combination::from_name(operator).is_some() {
            self.validate_group(obj, path, depth)
        } else if let Some(op) = CollectionOperator::from_name(operator) {
            self.validate_collection(obj, op, path, depth)
        } else {
            Err(ValidationDetails::unknown_operator(operator_path, operator).into())
        }
    }

    fn validate_condition(&self, obj: &Map<String, Value>, path: &str) -> FilterResult<()> {
        validate_property(obj, path)?;

        let value_path = make_path(path, "value");
        match obj.get("value") {
            Some(Value::String(_)) => {}
            Some(other) => {
                return Err(ValidationDetails::type_mismatch(
                    value_path,
                    "string",
                    json_type_name(other),
                )
                .into())
            }
            None => return Err(ValidationDetails::missing_field(value_path).into()),
        }

        match obj.get("ignoreCase") {
            None | Some(Value::Bool(_)) => Ok(()),
            Some(other) => Err(ValidationDetails::type_mismatch(
                make_path(path, "ignoreCase"),
                "boolean",
                json_type_name(other),
            )
            .into()),
        }
    }

    fn validate_group(
        &self,
        obj: &Map<String, Value>,
        path: &str,
        depth: usize,
    ) -> FilterResult<()> {
        let children_path = make_path(path, "children");
        let children = match obj.get("children") {
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(ValidationDetails::type_mismatch(
                    children_path,
                    "array",
                    json_type_name(other),
                )
                .into())
            }
            None => return Err(ValidationDetails::missing_field(children_path).into()),
        };

        if children.is_empty() {
            return Err(ValidationDetails::empty_group(children_path).into());
        }

        for (i, child) in children.iter().enumerate() {
            self.validate_node(child, &format!("{}[{}]", children_path, i), depth + 1)?;
        }
        Ok(())
    }

    fn validate_collection(
        &self,
        obj: &Map<String, Value>,
        operator: CollectionOperator,
        path: &str,
        depth: usize,
    ) -> FilterResult<()> {
        validate_property(obj, path)?;

        // has-elements ignores any predicate it is sent
        if !operator.requires_predicate() {
            return Ok(());
        }

        let predicate_path = make_path(path, "predicate");
        match obj.get("predicate") {
            Some(predicate) => self.validate_node(predicate, &predicate_path, depth + 1),
            None => Err(ValidationDetails::missing_field(predicate_path).into()),
        }
    }
}

fn validate_property(obj: &Map<String, Value>, path: &str) -> FilterResult<()> {
    let property_path = make_path(path, "property");
    match obj.get("property") {
        Some(Value::String(s)) if s.is_empty() => {
            Err(ValidationDetails::empty_property(property_path).into())
        }
        Some(Value::String(_)) => Ok(()),
        Some(other) => Err(ValidationDetails::type_mismatch(
            property_path,
            "string",
            json_type_name(other),
        )
        .into()),
        None => Err(ValidationDetails::missing_field(property_path).into()),
    }
}

fn make_path(prefix: &str, field: &str) -> String {
    format!("{}.{}", prefix, field)
}

/// Returns the JSON type name for error messages.
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
