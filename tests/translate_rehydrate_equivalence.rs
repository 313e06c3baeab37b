//! Translation / Rehydration Equivalence Tests
//!
//! For every supported predicate `p` and every element `x`:
//! - `rehydrate(translate(p))(x) == p(x)`
//! - the same holds after the tree crosses the wire
//! - a literal on either side of a comparison yields the same tree
//! - negation is pushed down to the leaves and never appears in a tree
//! - applying the same filters twice selects the same elements

use aerofilter::filter::{from_json, to_json, ConditionOperator, FilterNode};
use aerofilter::filterable;
use aerofilter::query::{self, QueryFilter};
use aerofilter::rehydrate::rehydrate;
use aerofilter::translate::{lit, member, not, translate, Expr};

// =============================================================================
// Test Model
// =============================================================================

#[derive(Debug)]
struct Order {
    total: f64,
    status: String,
}

filterable!(Order {
    scalar total,
    scalar status,
});

#[derive(Debug)]
struct Address {
    city: String,
    zip: Option<String>,
}

filterable!(Address {
    scalar city,
    optional zip,
});

#[derive(Debug)]
struct Person {
    name: String,
    email: Option<String>,
    age: u32,
    active: bool,
    address: Address,
    orders: Vec<Order>,
    tags: Vec<String>,
}

filterable!(Person {
    scalar name,
    optional email,
    scalar age,
    scalar active,
    nested address: Address,
    items orders: Order,
    values tags: String,
});

fn order(total: f64, status: &str) -> Order {
    Order {
        total,
        status: status.to_string(),
    }
}

fn population() -> Vec<Person> {
    vec![
        Person {
            name: "Ann Smith".into(),
            email: Some("ann@example.org".into()),
            age: 34,
            active: true,
            address: Address {
                city: "Oslo".into(),
                zip: Some("0150".into()),
            },
            orders: vec![order(120.0, "shipped"), order(15.5, "open")],
            tags: vec!["vip".into(), "Nordic".into()],
        },
        Person {
            name: "Joanne".into(),
            email: Some("joanne@charity.ORG".into()),
            age: 18,
            active: false,
            address: Address {
                city: "Bergen".into(),
                zip: None,
            },
            orders: vec![],
            tags: vec![],
        },
        Person {
            name: "Bob".into(),
            email: None,
            age: 61,
            active: true,
            address: Address {
                city: "Oslo".into(),
                zip: Some("0560".into()),
            },
            orders: vec![order(99.0, "open")],
            tags: vec!["new".into()],
        },
        Person {
            name: "annabel".into(),
            email: Some("annabel@example.com".into()),
            age: 9,
            active: false,
            address: Address {
                city: "Tromsø".into(),
                zip: Some("9008".into()),
            },
            orders: vec![order(300.0, "shipped"), order(450.0, "shipped")],
            tags: vec!["VIP".into()],
        },
    ]
}

type Native = fn(&Person) -> bool;

fn case(expr: Expr, native: Native) -> (Expr, Native) {
    (expr, native)
}

/// Predicates paired with the closure they stand for
fn cases() -> Vec<(Expr, Native)> {
    vec![
        case(member("age").ge(18), |p| p.age >= 18),
        case(member("age").lt(18), |p| p.age < 18),
        case(member("name").eq("Bob"), |p| p.name == "Bob"),
        case(member("active"), |p| p.active),
        case(not(member("active")), |p| !p.active),
        case(
            member("age").gt(18).and(member("active")),
            |p| p.age > 18 && p.active,
        ),
        case(
            not(member("age").gt(18).and(member("active"))),
            |p| !(p.age > 18 && p.active),
        ),
        case(
            not(member("name").eq("Bob").or(member("age").le(18))),
            |p| !(p.name == "Bob" || p.age <= 18),
        ),
        case(
            member("name").starts_with("Ann"),
            |p| p.name.starts_with("Ann"),
        ),
        case(
            member("name").starts_with_ignore_case("ANN"),
            |p| p.name.to_lowercase().starts_with("ann"),
        ),
        case(
            member("email").ends_with_ignore_case(".org"),
            |p| {
                p.email
                    .as_deref()
                    .is_some_and(|e| e.to_lowercase().ends_with(".org"))
            },
        ),
        case(
            member("email").ne("ann@example.org"),
            |p| p.email.as_deref() != Some("ann@example.org"),
        ),
        case(member("address.city").eq("Oslo"), |p| p.address.city == "Oslo"),
        case(
            member("address.zip").starts_with("0"),
            |p| p.address.zip.as_deref().is_some_and(|z| z.starts_with('0')),
        ),
        case(member("orders").has_any(), |p| !p.orders.is_empty()),
        case(
            member("orders").any(member("total").gt(100.0)),
            |p| p.orders.iter().any(|o| o.total > 100.0),
        ),
        case(
            member("orders").all(member("status").eq("shipped")),
            |p| p.orders.iter().all(|o| o.status == "shipped"),
        ),
        case(
            not(member("orders").any(member("status").eq("open"))),
            |p| !p.orders.iter().any(|o| o.status == "open"),
        ),
        case(
            not(member("orders").all(member("total").ge(100.0))),
            |p| !p.orders.iter().all(|o| o.total >= 100.0),
        ),
        case(member("tags").has_any(), |p| !p.tags.is_empty()),
        case(
            member("tags").contains("vip"),
            |p| p.tags.iter().any(|t| t == "vip"),
        ),
        case(
            member("tags").contains_ignore_case("VIP"),
            |p| p.tags.iter().any(|t| t.to_lowercase() == "vip"),
        ),
    ]
}

fn selected(filter: &QueryFilter<Person>, data: &[Person]) -> Vec<String> {
    filter.apply(data).map(|p| p.name.clone()).collect()
}

fn expected(native: Native, data: &[Person]) -> Vec<String> {
    data.iter().filter(|p| native(p)).map(|p| p.name.clone()).collect()
}

// =============================================================================
// Equivalence
// =============================================================================

/// The rebuilt filter agrees with the native closure on every element
#[test]
fn test_rehydrated_filter_matches_native_predicate() {
    let data = population();
    for (expr, native) in cases() {
        let node = translate(&expr).unwrap();
        let filter: QueryFilter<Person> = rehydrate(&node).unwrap();
        assert_eq!(
            selected(&filter, &data),
            expected(native, &data),
            "predicate {} translated to {}",
            expr,
            node
        );
    }
}

/// Same agreement after a trip through the wire format
#[test]
fn test_equivalence_survives_the_wire() {
    let data = population();
    for (expr, native) in cases() {
        let json = to_json(&translate(&expr).unwrap()).unwrap();
        let filter: QueryFilter<Person> = rehydrate(&from_json(&json).unwrap()).unwrap();
        assert_eq!(selected(&filter, &data), expected(native, &data), "{}", json);
    }
}

// =============================================================================
// Tree Shape
// =============================================================================

#[test]
fn test_literal_side_is_irrelevant() {
    let pairs = [
        (lit(18).lt(member("age")), member("age").gt(18)),
        (lit(18).le(member("age")), member("age").ge(18)),
        (lit(18).gt(member("age")), member("age").lt(18)),
        (lit(18).eq(member("age")), member("age").eq(18)),
        (lit("Bob").ne(member("name")), member("name").ne("Bob")),
    ];
    for (flipped, canonical) in pairs {
        assert_eq!(translate(&flipped).unwrap(), translate(&canonical).unwrap());
    }
}

#[test]
fn test_negation_lands_on_leaves() {
    let node = translate(&not(not(member("age").gt(18)))).unwrap();
    assert_eq!(
        node,
        FilterNode::condition("age", ConditionOperator::GreaterThan, "18").unwrap()
    );

    let node = translate(&not(member("age").gt(18))).unwrap();
    assert_eq!(
        node,
        FilterNode::condition("age", ConditionOperator::LessThanOrEqual, "18").unwrap()
    );

    // !(a && b) == !a || !b
    let node = translate(&not(member("age").gt(18).and(member("active")))).unwrap();
    let expected = FilterNode::condition("age", ConditionOperator::LessThanOrEqual, "18")
        .unwrap()
        .or(FilterNode::condition("active", ConditionOperator::Equals, "false").unwrap());
    assert_eq!(node, expected);
}

#[test]
fn test_unsupported_shapes_fail_translation() {
    let shapes = [
        member("a").eq(member("b")),
        lit(true),
        not(member("name").contains("x")),
        not(member("orders").has_any()),
        member("name").method("len", vec![]),
    ];
    for expr in shapes {
        let err = translate(&expr).unwrap_err();
        assert_eq!(err.code(), "FILTER_TRANSLATION_FAILED", "{}", expr);
    }
}

// =============================================================================
// Application
// =============================================================================

#[test]
fn test_apply_all_is_idempotent() {
    let data = population();
    let adults: QueryFilter<Person> = rehydrate(&translate(&member("age").ge(18)).unwrap()).unwrap();
    let in_oslo: QueryFilter<Person> =
        rehydrate(&translate(&member("address.city").eq("Oslo")).unwrap()).unwrap();

    let once: Vec<&Person> =
        query::apply_all(&data, [Some(adults.clone()), None, Some(in_oslo.clone())]).collect();
    let twice: Vec<&Person> = query::apply_all(
        once.iter().copied(),
        [Some(adults), Some(in_oslo)],
    )
    .collect();

    let names: Vec<&str> = twice.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Ann Smith", "Bob"]);
    assert_eq!(once.len(), twice.len());
}

#[test]
fn test_rehydration_errors_name_the_member() {
    let unknown = FilterNode::condition("address.country", ConditionOperator::Equals, "NO").unwrap();
    let err = rehydrate::<Person>(&unknown).unwrap_err();
    assert_eq!(err.code(), "FILTER_REHYDRATION_FAILED");
    assert!(err.to_string().contains("address.country"), "{}", err);

    let bad_literal = FilterNode::condition("age", ConditionOperator::GreaterThan, "old").unwrap();
    assert!(rehydrate::<Person>(&bad_literal).is_err());
}
