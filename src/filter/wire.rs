//! Filter serializer
//!
//! Wire shape: one JSON object per node, discriminated by `operator`.
//!
//! ```json
//! {"operator": "and", "children": [
//!   {"operator": "contains", "property": "name", "value": "Ann", "ignoreCase": true},
//!   {"operator": "any", "property": "orders",
//!    "predicate": {"operator": "greaterThan", "property": "total", "value": "100"}}
//! ]}
//! ```
//!
//! Deserialization always validates the raw payload before building nodes.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use super::errors::{FilterError, FilterResult, ValidationDetails};
use super::node::{
    CollectionCondition, CollectionOperator, Combination, Condition, ConditionOperator, FilterNode,
    Group,
};
use super::validator::FilterValidator;

/// Wire representation of a node
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireNode {
    operator: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    property: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ignore_case: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    children: Option<Vec<WireNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    predicate: Option<Box<WireNode>>,
}

impl WireNode {
    fn bare(operator: &str) -> Self {
        Self {
            operator: operator.to_string(),
            property: None,
            value: None,
            ignore_case: None,
            children: None,
            predicate: None,
        }
    }
}

/// Drop `predicate` from collection nodes that take none, at any depth.
/// The validator never looks at it, so its shape must not matter here either.
fn strip_unused_predicates(value: &mut Value) {
    let Some(obj) = value.as_object_mut() else {
        return;
    };
    let unused = obj
        .get("operator")
        .and_then(Value::as_str)
        .and_then(CollectionOperator::from_name)
        .is_some_and(|op| !op.requires_predicate());
    if unused {
        obj.remove("predicate");
    }
    if let Some(Value::Array(children)) = obj.get_mut("children") {
        children.iter_mut().for_each(strip_unused_predicates);
    }
    if let Some(predicate) = obj.get_mut("predicate") {
        strip_unused_predicates(predicate);
    }
}

impl From<&FilterNode> for WireNode {
    fn from(node: &FilterNode) -> Self {
        match node {
            FilterNode::Condition(c) => WireNode {
                property: Some(c.path().to_string()),
                value: Some(c.value().to_string()),
                ignore_case: Some(c.ignore_case()),
                ..WireNode::bare(c.operator().as_str())
            },
            FilterNode::Group(g) => WireNode {
                children: Some(g.children().iter().map(WireNode::from).collect()),
                ..WireNode::bare(g.combination().as_str())
            },
            FilterNode::Collection(c) => WireNode {
                property: Some(c.path().to_string()),
                predicate: c.predicate().map(|p| Box::new(WireNode::from(p))),
                ..WireNode::bare(c.operator().as_str())
            },
        }
    }
}

impl TryFrom<WireNode> for FilterNode {
    type Error = FilterError;

    fn try_from(wire: WireNode) -> FilterResult<Self> {
        let missing = |field: &str| FilterError::from(ValidationDetails::missing_field(field));

        if let Some(op) = ConditionOperator::from_name(&wire.operator) {
            let property = wire.property.ok_or_else(|| missing("property"))?;
            let value = wire.value.ok_or_else(|| missing("value"))?;
            let condition = Condition::new(property, op, value)?
                .with_ignore_case(wire.ignore_case.unwrap_or(false));
            return Ok(FilterNode::Condition(condition));
        }

        if let Some(combination) = Combination::from_name(&wire.operator) {
            let children = wire
                .children
                .ok_or_else(|| missing("children"))?
                .into_iter()
                .map(FilterNode::try_from)
                .collect::<FilterResult<Vec<_>>>()?;
            return Ok(FilterNode::Group(Group::new(combination, children)?));
        }

        if let Some(op) = CollectionOperator::from_name(&wire.operator) {
            let property = wire.property.ok_or_else(|| missing("property"))?;
            let predicate = match (op.requires_predicate(), wire.predicate) {
                (true, Some(p)) => Some(FilterNode::try_from(*p)?),
                (true, None) => return Err(missing("predicate")),
                (false, _) => None,
            };
            return Ok(FilterNode::Collection(CollectionCondition::with_operator(
                property, op, predicate,
            )?));
        }

        Err(ValidationDetails::unknown_operator("operator", &wire.operator).into())
    }
}

impl Serialize for FilterNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        WireNode::from(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for FilterNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        FilterSerializer::default()
            .from_value(raw)
            .map_err(D::Error::custom)
    }
}

/// Bidirectional conversion between trees and wire text
#[derive(Debug, Clone, Default)]
pub struct FilterSerializer {
    validator: FilterValidator,
}

impl FilterSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_validator(validator: FilterValidator) -> Self {
        Self { validator }
    }

    pub fn validator(&self) -> &FilterValidator {
        &self.validator
    }

    pub fn to_value(&self, node: &FilterNode) -> FilterResult<Value> {
        Ok(serde_json::to_value(WireNode::from(node))?)
    }

    pub fn to_string(&self, node: &FilterNode) -> FilterResult<String> {
        Ok(serde_json::to_string(&WireNode::from(node))?)
    }

    pub fn to_string_pretty(&self, node: &FilterNode) -> FilterResult<String> {
        Ok(serde_json::to_string_pretty(&WireNode::from(node))?)
    }

    /// Validate, then build the tree
    pub fn from_value(&self, mut payload: Value) -> FilterResult<FilterNode> {
        self.validator.validate(&payload)?;
        strip_unused_predicates(&mut payload);
        let wire: WireNode = serde_json::from_value(payload)?;
        FilterNode::try_from(wire)
    }

    pub fn from_str(&self, payload: &str) -> FilterResult<FilterNode> {
        let raw: Value = serde_json::from_str(payload)?;
        self.from_value(raw)
    }

    pub fn from_slice(&self, payload: &[u8]) -> FilterResult<FilterNode> {
        let raw: Value = serde_json::from_slice(payload)?;
        self.from_value(raw)
    }
}

/// Serialize with the default serializer
pub fn to_json(node: &FilterNode) -> FilterResult<String> {
    FilterSerializer::default().to_string(node)
}

/// Validate and deserialize with the default serializer
pub fn from_json(payload: &str) -> FilterResult<FilterNode> {
    FilterSerializer::default().from_str(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_tree() -> FilterNode {
        let name = Condition::new("name", ConditionOperator::Contains, "Ann")
            .unwrap()
            .with_ignore_case(true);
        let orders = CollectionCondition::any(
            "orders",
            FilterNode::condition("total", ConditionOperator::GreaterThan, "100").unwrap(),
        )
        .unwrap();
        let tags = CollectionCondition::has_elements("tags").unwrap();
        FilterNode::group(
            Combination::And,
            vec![name.into(), orders.into(), tags.into()],
        )
        .unwrap()
    }

    #[test]
    fn test_round_trip() {
        let tree = sample_tree();
        let text = to_json(&tree).unwrap();
        assert_eq!(from_json(&text).unwrap(), tree);
    }

    #[test]
    fn test_wire_shape() {
        let value = FilterSerializer::new().to_value(&sample_tree()).unwrap();
        assert_eq!(value["operator"], "and");
        assert_eq!(value["children"][0]["property"], "name");
        assert_eq!(value["children"][0]["ignoreCase"], true);
        assert_eq!(value["children"][1]["predicate"]["value"], "100");
        assert!(value["children"][2].get("predicate").is_none());
    }

    #[test]
    fn test_deserialize_validates_first() {
        let err = from_json(r#"{"operator":"and","children":[]}"#).unwrap_err();
        assert_eq!(err.code(), "FILTER_VALIDATION_FAILED");

        let err = from_json("{not json").unwrap_err();
        assert_eq!(err.code(), "FILTER_MALFORMED_PAYLOAD");
    }

    #[test]
    fn test_has_elements_ignores_predicate() {
        let payload = json!({
            "operator": "hasElements",
            "property": "tags",
            "predicate": {"operator": "bogus"}
        });
        let node = FilterSerializer::new().from_value(payload).unwrap();
        assert_eq!(node, CollectionCondition::has_elements("tags").unwrap().into());
    }

    #[test]
    fn test_has_elements_ignores_non_object_predicate() {
        let serializer = FilterSerializer::new();
        let tags: FilterNode = CollectionCondition::has_elements("tags").unwrap().into();

        for predicate in [json!(5), json!("x"), json!([1, 2]), json!(null)] {
            let payload = json!({"operator": "hasElements", "property": "tags", "predicate": predicate});
            assert_eq!(serializer.from_value(payload).unwrap(), tags);
        }

        let nested = json!({"operator": "and", "children": [
            {"operator": "hasElements", "property": "tags", "predicate": 5}
        ]});
        let node = serializer.from_value(nested).unwrap();
        assert_eq!(node, FilterNode::Group(Group::new(Combination::And, vec![tags]).unwrap()));

        // a predicate that is required still has to be a node
        let any = json!({"operator": "any", "property": "tags", "predicate": 5});
        assert!(serializer.from_value(any).is_err());
    }

    #[test]
    fn test_serde_embedding() {
        #[derive(Serialize, Deserialize)]
        struct Envelope {
            filter: FilterNode,
        }

        let text = serde_json::to_string(&Envelope {
            filter: sample_tree(),
        })
        .unwrap();
        let back: Envelope = serde_json::from_str(&text).unwrap();
        assert_eq!(back.filter, sample_tree());

        let bad = r#"{"filter":{"operator":"equals","value":"x"}}"#;
        assert!(serde_json::from_str::<Envelope>(bad).is_err());
    }
}
