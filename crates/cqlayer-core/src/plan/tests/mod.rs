mod property;

use super::*;
use crate::{
    catalog::{InMemoryCatalog, NativeType, TableSchema},
    naming::SnakeCaseNaming,
    query::{Evaluator, Operand},
};

fn keys() -> KeyMetadata {
    KeyMetadata::new(
        vec!["tenant_id".to_string()],
        vec!["user_id".to_string()],
        vec!["status".to_string(), "tags".to_string()],
    )
    .with_collection("tags")
}

fn plan_of(query: &Query) -> PushdownPlan {
    plan(query, &keys(), &SnakeCaseNaming, &[]).expect("query should plan")
}

#[test]
fn key_only_query_is_fully_pushed_in_first_occurrence_order() {
    let query = Query::new("userProfile")
        .filter(Evaluator::equals("userId", 3))
        .filter(Evaluator::equals("tenantId", 7));

    let plan = plan_of(&query);

    assert_eq!(
        plan.where_clause().as_deref(),
        Some("user_id = ? AND tenant_id = ?")
    );
    assert_eq!(plan.values(), &[Value::Int(3), Value::Int(7)]);
    assert!(!plan.has_residual());
}

#[test]
fn non_key_fields_stay_residual() {
    let query = Query::new("userProfile")
        .filter(Evaluator::equals("tenantId", 7))
        .filter(Evaluator::equals("displayName", "ann"));

    let plan = plan_of(&query);

    assert_eq!(plan.where_clause().as_deref(), Some("tenant_id = ?"));
    assert_eq!(
        plan.residual().predicate(),
        &[Evaluator::equals("displayName", "ann")]
    );
}

#[test]
fn conflicting_kinds_keep_the_field_residual() {
    let query = Query::new("userProfile")
        .filter(Evaluator::greater_than("userId", 1))
        .filter(Evaluator::smaller_than("userId", 9))
        .filter(Evaluator::greater_than("userId", 2));

    let plan = plan_of(&query);

    assert_eq!(plan.where_clause(), None);
    assert!(plan.values().is_empty());
    assert_eq!(plan.residual().predicate().len(), 3);
}

#[test]
fn repeated_range_values_emit_one_fragment_each() {
    let query = Query::new("userProfile")
        .filter(Evaluator::greater_than("userId", 1))
        .filter(Evaluator::greater_than("userId", 4));

    let plan = plan_of(&query);

    assert_eq!(
        plan.where_clause().as_deref(),
        Some("user_id > ? AND user_id > ?")
    );
}

#[test]
fn repeated_equality_binds_the_first_value_once() {
    let query = Query::new("userProfile")
        .filter(Evaluator::equals("status", "ACTIVE"))
        .filter(Evaluator::equals("status", "ACTIVE"))
        .filter(Evaluator::equals("status", "PENDING"));

    let plan = plan_of(&query);

    assert_eq!(plan.where_clause().as_deref(), Some("status = ?"));
    assert_eq!(plan.values(), &[Value::from("ACTIVE")]);
    assert_eq!(plan.pushed().len(), 2);
    assert_eq!(
        plan.residual().predicate(),
        &[Evaluator::equals("status", "PENDING")]
    );
}

#[test]
fn membership_on_collections_pushes_contains() {
    let query = Query::new("userProfile").filter(Evaluator::in_("tags", "vip"));

    let plan = plan_of(&query);

    assert_eq!(plan.where_clause().as_deref(), Some("tags CONTAINS ?"));
    assert_eq!(plan.values(), &[Value::from("vip")]);
}

#[test]
fn membership_on_scalars_pushes_an_in_list() {
    let query = Query::new("userProfile").filter(Evaluator::in_(
        "userId",
        Value::Set(vec![Value::Int(1), Value::Int(2)]),
    ));

    let plan = plan_of(&query);

    assert_eq!(plan.where_clause().as_deref(), Some("user_id IN (?, ?)"));
    assert_eq!(plan.values(), &[Value::Int(1), Value::Int(2)]);
}

#[test]
fn repeated_membership_on_scalars_intersects() {
    let query = Query::new("userProfile")
        .filter(Evaluator::in_("userId", vec![1, 2, 3]))
        .filter(Evaluator::in_("userId", vec![3, 2, 5]));

    let plan = plan_of(&query);

    assert_eq!(plan.where_clause().as_deref(), Some("user_id IN (?, ?)"));
    assert_eq!(plan.values(), &[Value::Int(2), Value::Int(3)]);
}

#[test]
fn scalar_membership_needs_a_sequence_operand() {
    let query = Query::new("userProfile").filter(Evaluator::in_("userId", 4));

    let err = plan(&query, &keys(), &SnakeCaseNaming, &[]).unwrap_err();

    assert!(err.is_configuration());
}

#[test]
fn parameters_resolve_before_planning() {
    let query = Query::new("userProfile").filter(Evaluator::equals("tenantId", Operand::Parameter(0)));

    let plan = plan(&query, &keys(), &SnakeCaseNaming, &[Value::Int(11)]).unwrap();

    assert_eq!(plan.values(), &[Value::Int(11)]);
}

#[test]
fn disjunctions_are_never_pushed() {
    let query = Query::new("userProfile").filter(Evaluator::or(vec![
        Evaluator::equals("tenantId", 1),
        Evaluator::equals("tenantId", 2),
    ]));

    let plan = plan_of(&query);

    assert_eq!(plan.where_clause(), None);
    assert!(plan.has_residual());
}

#[test]
fn residual_only_kinds_do_not_disable_pushdown() {
    let query = Query::new("userProfile")
        .filter(Evaluator::equals("tenantId", 1))
        .filter(Evaluator::not_equals("tenantId", 2));

    let plan = plan_of(&query);

    assert_eq!(plan.where_clause().as_deref(), Some("tenant_id = ?"));
    assert_eq!(
        plan.residual().predicate(),
        &[Evaluator::not_equals("tenantId", 2)]
    );
}

#[test]
fn nested_conjunctions_are_flattened() {
    let query = Query::new("userProfile").filter(Evaluator::and(vec![
        Evaluator::equals("tenantId", 1),
        Evaluator::and(vec![Evaluator::equals("userId", 2)]),
    ]));

    let plan = plan_of(&query);

    assert_eq!(
        plan.where_clause().as_deref(),
        Some("tenant_id = ? AND user_id = ?")
    );
    assert!(!plan.has_residual());
}

///
/// LIMIT POLICY
///

#[test]
fn limit_pushdown_policy() {
    assert_eq!(limit_pushdown(Some(10), Some(5), false), Some(15));
    assert_eq!(limit_pushdown(Some(10), None, false), Some(10));
    assert_eq!(limit_pushdown(Some(10), Some(5), true), None);
    assert_eq!(limit_pushdown(None, Some(5), false), None);
}

#[test]
fn plan_limit_follows_the_residual() {
    let pushed_only = Query::new("userProfile")
        .filter(Evaluator::equals("tenantId", 1))
        .limit(10)
        .start(5);
    let with_residual = pushed_only
        .clone()
        .filter(Evaluator::equals("displayName", "x"));

    assert_eq!(plan_of(&pushed_only).native_limit(), Some(15));
    assert_eq!(plan_of(&with_residual).native_limit(), None);
}

#[test]
fn client_window_skips_then_takes() {
    let rows = vec![1, 2, 3, 4, 5, 6];

    assert_eq!(client_window(rows.clone(), Some(2), Some(3)), vec![3, 4, 5]);
    assert_eq!(client_window(rows.clone(), None, Some(2)), vec![1, 2]);
    assert_eq!(client_window(rows, Some(5), None), vec![6]);
}

///
/// KEY METADATA
///

#[test]
fn key_metadata_resolves_collection_flags_from_the_catalog() {
    let catalog = InMemoryCatalog::new().with_table(
        TableSchema::new("user_profile")
            .partition_key("tenant_id", NativeType::BigInt)
            .clustering_key("user_id", NativeType::BigInt)
            .column("tags", NativeType::Set(Box::new(NativeType::Text)))
            .index("values(tags)"),
    );

    let keys = KeyMetadata::resolve(&catalog, "user_profile").unwrap();

    assert_eq!(keys.pushdown_keys(), vec!["tenant_id", "user_id", "tags"]);
    assert!(keys.is_collection("tags"));
    assert!(!keys.is_collection("user_id"));
    assert!(keys.is_row_key("user_id"));
    assert!(!keys.is_row_key("tags"));
}

#[test]
fn key_metadata_for_an_unknown_resource_is_a_schema_error() {
    let err = KeyMetadata::resolve(&InMemoryCatalog::new(), "missing").unwrap_err();

    assert!(err.is_schema());
}

#[test]
fn disjoint_membership_lists_stay_residual() {
    let query = Query::new("userProfile")
        .filter(Evaluator::in_("userId", vec![1, 2]))
        .filter(Evaluator::in_("userId", vec![3]));

    let plan = plan_of(&query);

    assert_eq!(plan.where_clause(), None);
    assert_eq!(plan.residual().predicate().len(), 2);
}
