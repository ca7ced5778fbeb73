use crate::{
    naming::SnakeCaseNaming,
    plan::{KeyMetadata, limit_pushdown, plan},
    query::{Evaluator, EvaluatorKind, Query},
    value::Value,
};
use proptest::prelude::*;

const KEY_FIELDS: [&str; 3] = ["tenantId", "userId", "status"];
const PLAIN_FIELDS: [&str; 2] = ["displayName", "nickname"];

fn keys() -> KeyMetadata {
    KeyMetadata::new(
        vec!["tenant_id".to_string()],
        vec!["user_id".to_string()],
        vec!["status".to_string()],
    )
}

fn arb_field() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just(KEY_FIELDS[0]),
        Just(KEY_FIELDS[1]),
        Just(KEY_FIELDS[2]),
        Just(PLAIN_FIELDS[0]),
        Just(PLAIN_FIELDS[1]),
    ]
}

fn arb_kind() -> impl Strategy<Value = EvaluatorKind> {
    prop_oneof![
        Just(EvaluatorKind::Equals),
        Just(EvaluatorKind::GreaterThan),
        Just(EvaluatorKind::GreaterThanOrEqual),
        Just(EvaluatorKind::SmallerThan),
        Just(EvaluatorKind::SmallerThanOrEqual),
        Just(EvaluatorKind::NotEquals),
    ]
}

fn arb_leaf() -> impl Strategy<Value = Evaluator> {
    (arb_field(), arb_kind(), any::<i64>())
        .prop_map(|(field, kind, value)| Evaluator::field(field, kind, Value::Int(value)))
}

fn arb_evaluator() -> impl Strategy<Value = Evaluator> {
    arb_leaf().prop_recursive(3, 16, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 1..4).prop_map(Evaluator::and),
            prop::collection::vec(inner, 1..4).prop_map(Evaluator::or),
        ]
    })
}

fn arb_query() -> impl Strategy<Value = Query> {
    prop::collection::vec(arb_evaluator(), 0..6).prop_map(|evaluators| {
        evaluators
            .into_iter()
            .fold(Query::new("userProfile"), Query::filter)
    })
}

fn leaf_total(query: &Query) -> usize {
    query.predicate().iter().map(Evaluator::leaf_count).sum()
}

proptest! {
    #[test]
    fn pushed_and_residual_partition_the_leaves(query in arb_query()) {
        let plan = plan(&query, &keys(), &SnakeCaseNaming, &[]).unwrap();

        prop_assert_eq!(plan.pushed().len() + leaf_total(plan.residual()), leaf_total(&query));
    }

    #[test]
    fn single_kind_key_equality_is_fully_pushed_in_order(
        fields in prop::sample::subsequence(KEY_FIELDS.to_vec(), 1..=3).prop_shuffle(),
        values in prop::collection::vec(any::<i64>(), 3),
    ) {
        let query = fields
            .iter()
            .zip(&values)
            .fold(Query::new("userProfile"), |query, (field, value)| {
                query.filter(Evaluator::equals(*field, *value))
            });

        let plan = plan(&query, &keys(), &SnakeCaseNaming, &[]).unwrap();
        let columns: Vec<String> = fields
            .iter()
            .map(|field| format!("{} = ?", crate::naming::Naming::normalize(&SnakeCaseNaming, field)))
            .collect();

        prop_assert_eq!(plan.fragments(), columns.as_slice());
        prop_assert!(!plan.has_residual());
    }

    #[test]
    fn conflicting_kinds_are_never_pushed(
        field in prop_oneof![Just(KEY_FIELDS[0]), Just(KEY_FIELDS[1])],
        first in any::<i64>(),
        second in any::<i64>(),
    ) {
        let query = Query::new("userProfile")
            .filter(Evaluator::greater_than(field, first))
            .filter(Evaluator::smaller_than_or_equal(field, second));

        let plan = plan(&query, &keys(), &SnakeCaseNaming, &[]).unwrap();

        prop_assert!(plan.fragments().is_empty());
        prop_assert_eq!(leaf_total(plan.residual()), 2);
    }

    #[test]
    fn native_limit_is_only_set_without_a_residual(
        limit in any::<Option<u32>>(),
        start in any::<Option<u32>>(),
        residual in any::<bool>(),
    ) {
        let native = limit_pushdown(limit, start, residual);

        if residual || limit.is_none() {
            prop_assert_eq!(native, None);
        } else {
            prop_assert!(native >= limit);
        }
    }
}
