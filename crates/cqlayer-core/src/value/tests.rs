use super::*;
use std::cmp::Ordering;

struct Marker;

#[test]
fn coerce_lowers_enums_and_type_references_to_text() {
    assert_eq!(
        coerce(Value::Enum(ValueEnum::loose("ACTIVE"))),
        Value::from("ACTIVE")
    );
    assert_eq!(
        coerce(Value::Type(TypeRef::of::<Marker>())),
        Value::Text(std::any::type_name::<Marker>().to_string())
    );
}

#[test]
fn coerce_sorts_and_dedups_sets() {
    let set = Value::Set(vec![
        Value::from("b"),
        Value::Enum(ValueEnum::loose("a")),
        Value::from("b"),
    ]);

    assert_eq!(
        coerce(set),
        Value::Set(vec![Value::from("a"), Value::from("b")])
    );
}

#[test]
fn coerce_keeps_list_order() {
    let list = Value::List(vec![Value::Int(3), Value::Int(1), Value::Int(3)]);

    assert_eq!(coerce(list.clone()), list);
}

#[test]
fn coerce_sorts_map_entries_by_key() {
    let map = Value::Map(vec![
        (Value::from("z"), Value::Int(1)),
        (Value::from("a"), Value::Enum(ValueEnum::loose("ON"))),
    ]);

    assert_eq!(
        coerce(map),
        Value::Map(vec![
            (Value::from("a"), Value::from("ON")),
            (Value::from("z"), Value::Int(1)),
        ])
    );
}

#[test]
fn canonical_order_ranks_variants_first() {
    assert_eq!(canonical_cmp(&Value::Null, &Value::Bool(false)), Ordering::Less);
    assert_eq!(canonical_cmp(&Value::Int(9), &Value::from("a")), Ordering::Less);
    assert_eq!(canonical_cmp(&Value::Int(2), &Value::Double(1.5)), Ordering::Greater);
    assert_eq!(canonical_cmp(&Value::from("a"), &Value::from("b")), Ordering::Less);
}

#[test]
fn strict_order_compares_numbers_across_variants() {
    assert_eq!(
        strict_order_cmp(&Value::Int(2), &Value::Double(2.5)),
        Some(Ordering::Less)
    );
    assert_eq!(strict_order_cmp(&Value::Int(2), &Value::from("2")), None);
    assert_eq!(
        strict_order_cmp(&Value::Set(Vec::new()), &Value::Set(Vec::new())),
        None
    );
}

#[test]
fn loose_equality_ignores_set_order_and_numeric_variant() {
    let left = Value::Set(vec![Value::from("a"), Value::from("b")]);
    let right = Value::Set(vec![Value::from("b"), Value::from("a")]);

    assert!(loose_eq(&left, &right));
    assert!(loose_eq(&Value::Int(3), &Value::Double(3.0)));
    assert!(loose_eq(
        &Value::Enum(ValueEnum::new("A", Some("x::E"))),
        &Value::Enum(ValueEnum::loose("A"))
    ));
    assert!(!loose_eq(
        &Value::List(vec![Value::Int(1), Value::Int(2)]),
        &Value::List(vec![Value::Int(2), Value::Int(1)])
    ));
}

#[test]
fn display_renders_cql_literals() {
    assert_eq!(Value::from("Ann").to_string(), "'Ann'");
    assert_eq!(Value::Blob(vec![0x0a, 0xff]).to_string(), "0x0aff");
    assert_eq!(
        Value::Set(vec![Value::Int(1), Value::Int(2)]).to_string(),
        "{1, 2}"
    );
    assert_eq!(
        Value::Map(vec![(Value::from("k"), Value::Bool(true))]).to_string(),
        "{'k': true}"
    );
}

#[test]
fn sequences_borrow_lists_and_sets_only() {
    assert_eq!(
        Value::Set(vec![Value::Int(1)]).as_sequence(),
        Some(&[Value::Int(1)][..])
    );
    assert_eq!(Value::Int(1).as_sequence(), None);
    assert_eq!(
        Value::from(vec![1, 2]).into_sequence(),
        Some(vec![Value::Int(1), Value::Int(2)])
    );
}
