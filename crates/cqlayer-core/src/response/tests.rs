use super::*;

#[test]
fn shape_follows_item_count() {
    assert_eq!(ResultSet::<u8>::shaped(vec![]), ResultSet::Empty);
    assert_eq!(ResultSet::shaped(vec![7_u8]), ResultSet::Single(7));
    assert_eq!(ResultSet::shaped(vec![1_u8, 2]), ResultSet::Collection(vec![1, 2]));
}

#[test]
fn one_opt_rejects_multiple_items() {
    let err = ResultSet::shaped(vec![1_u8, 2, 3]).one_opt().unwrap_err();

    assert_eq!(err.class, ErrorClass::Mapping);
    assert!(err.message.contains('3'));
}

#[test]
fn one_opt_accepts_zero_or_one() {
    assert_eq!(ResultSet::<u8>::Empty.one_opt().unwrap(), None);
    assert_eq!(ResultSet::Single(4_u8).one_opt().unwrap(), Some(4));
}

#[test]
fn map_rows_count_but_have_no_items() {
    let rows = vec![RowMap::from_iter([("a", Value::Int(1))]), RowMap::new()];
    let result: ResultSet = ResultSet::map_rows(rows);

    assert_eq!(result.len(), 2);
    assert!(result.clone().into_items().is_empty());
    assert_eq!(result.into_rows().len(), 2);
}

#[test]
fn row_map_insert_replaces_in_place() {
    let mut row = RowMap::from_iter([("a", Value::Int(1)), ("b", Value::Int(2))]);
    row.insert("a", Value::Int(9));

    let keys: Vec<&str> = row.iter().map(|(key, _)| key).collect();

    assert_eq!(keys, vec!["a", "b"]);
    assert_eq!(row.get("a"), Some(&Value::Int(9)));
    assert!(!row.contains("c"));
}

#[test]
fn denormalize_rekeys_by_application_names() {
    let row = RowMap::from_iter([
        ("user_id", Value::Int(1)),
        ("display_name", Value::from("Ann")),
    ]);

    let row = row.denormalize(&crate::naming::SnakeCaseNaming);

    assert_eq!(row.get("userId"), Some(&Value::Int(1)));
    assert_eq!(row.get("displayName"), Some(&Value::from("Ann")));
    assert!(!row.contains("user_id"));
}
