//! Filter Round Trip Tests
//!
//! - A tree serialized and deserialized is structurally equal
//! - Deserialization validates before building anything
//! - A filter survives the wire and still selects the same elements

use aerofilter::filter::{
    from_json, to_json, CollectionCondition, Condition, ConditionOperator, FilterNode,
    FilterSerializer,
};
use aerofilter::filterable;
use aerofilter::query::{self, QueryFilter};
use aerofilter::rehydrate::rehydrate;
use aerofilter::translate::{member, not, translate};
use serde_json::json;

// =============================================================================
// Test Model
// =============================================================================

#[derive(Debug)]
struct Person {
    name: String,
    email: Option<String>,
}

filterable!(Person {
    scalar name,
    optional email,
});

fn person(name: &str, email: &str) -> Person {
    Person {
        name: name.to_string(),
        email: Some(email.to_string()),
    }
}

fn people() -> Vec<Person> {
    vec![
        person("Ann Smith", "ann@example.org"),
        person("Joanne", "joanne@charity.ORG"),
        person("Annabel", "annabel@example.com"),
    ]
}

fn names<'a>(seq: impl Iterator<Item = &'a Person>) -> Vec<&'a str> {
    seq.map(|p| p.name.as_str()).collect()
}

// =============================================================================
// Round Trip
// =============================================================================

fn sample_trees() -> Vec<FilterNode> {
    vec![
        translate(&member("age").ge(18)).unwrap(),
        translate(&not(member("age").gt(18).and(member("active")))).unwrap(),
        translate(&member("name").starts_with_ignore_case("ann")).unwrap(),
        translate(&member("orders").any(member("total").gt(99.5))).unwrap(),
        translate(&member("orders").all(member("lines").has_any())).unwrap(),
        FilterNode::group(
            aerofilter::filter::Combination::Or,
            vec![
                FilterNode::condition("a", ConditionOperator::Equals, "").unwrap(),
                FilterNode::condition("b.c", ConditionOperator::NotEquals, "x \"y\"").unwrap(),
                CollectionCondition::has_elements("tags").unwrap().into(),
            ],
        )
        .unwrap(),
    ]
}

#[test]
fn test_round_trip_is_structural_identity() {
    for tree in sample_trees() {
        let json = to_json(&tree).unwrap();
        let back = from_json(&json).unwrap();
        assert_eq!(back, tree, "{}", json);
    }
}

#[test]
fn test_pretty_and_compact_forms_agree() {
    let serializer = FilterSerializer::new();
    for tree in sample_trees() {
        let pretty = serializer.to_string_pretty(&tree).unwrap();
        let compact = serializer.to_string(&tree).unwrap();
        assert_eq!(serializer.from_str(&pretty).unwrap(), serializer.from_str(&compact).unwrap());
    }
}

#[test]
fn test_wire_shape_of_condition() {
    let node: FilterNode = Condition::new("email", ConditionOperator::EndsWith, ".org")
        .unwrap()
        .with_ignore_case(true)
        .into();
    let value = FilterSerializer::new().to_value(&node).unwrap();
    assert_eq!(
        value,
        json!({
            "operator": "endsWith",
            "property": "email",
            "value": ".org",
            "ignoreCase": true
        })
    );
}

#[test]
fn test_invalid_payloads_never_deserialize() {
    let payloads = [
        json!({"operator": "between", "property": "age", "value": "1"}),
        json!({"operator": "equals", "value": "1"}),
        json!({"operator": "or", "children": []}),
        json!({"operator": "contains", "property": "name", "value": "a", "ignoreCase": "yes"}),
    ];
    for payload in payloads {
        let err = from_json(&payload.to_string()).unwrap_err();
        assert_eq!(err.code(), "FILTER_VALIDATION_FAILED", "{}", payload);
    }
}

// =============================================================================
// End-to-End Example
// =============================================================================

#[test]
fn test_composed_filters_select_two_of_three() {
    let by_name = query::contains_ignore_case(|p: &Person| Some(p.name.as_str()), Some("Ann"));
    let by_email = query::ends_with_ignore_case(|p: &Person| p.email.as_deref(), Some(".org"));
    let filter: QueryFilter<Person> = query::join([by_name, by_email], true);

    let data = people();
    assert_eq!(names(query::apply(&data, &filter)), vec!["Ann Smith", "Joanne"]);
}

#[test]
fn test_same_selection_after_the_wire() {
    let expr = member("name")
        .contains_ignore_case("Ann")
        .and(member("email").ends_with_ignore_case(".org"));
    let json = to_json(&translate(&expr).unwrap()).unwrap();

    let filter: QueryFilter<Person> = rehydrate(&from_json(&json).unwrap()).unwrap();
    let data = people();
    assert_eq!(names(filter.apply(&data)), vec!["Ann Smith", "Joanne"]);
}
