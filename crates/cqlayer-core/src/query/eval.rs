use crate::{
    error::InternalError,
    query::{Evaluator, EvaluatorKind, FieldEvaluator, Operand},
    value::{Value, coerce, loose_eq, strict_order_cmp},
};
use std::cmp::Ordering;

///
/// FieldSource
///
/// Anything a residual predicate can be evaluated against: native rows,
/// row maps or materialized records. `None` means the field is absent.
///

pub trait FieldSource {
    fn field_value(&self, field: &str) -> Option<Value>;
}

/// Evaluate a bound predicate conjunction against one source.
///
/// Both sides are coerced before comparison, so enum fields match their
/// label and sets match regardless of element order. A missing field never
/// matches.
pub fn matches<S: FieldSource + ?Sized>(
    source: &S,
    predicate: &[Evaluator],
) -> Result<bool, InternalError> {
    for evaluator in predicate {
        if !eval(source, evaluator)? {
            return Ok(false);
        }
    }

    Ok(true)
}

fn eval<S: FieldSource + ?Sized>(source: &S, evaluator: &Evaluator) -> Result<bool, InternalError> {
    match evaluator {
        Evaluator::Field(field) => eval_field(source, field),
        Evaluator::And(children) => matches(source, children),
        Evaluator::Or(children) => {
            for child in children {
                if eval(source, child)? {
                    return Ok(true);
                }
            }

            Ok(false)
        }
    }
}

fn eval_field<S: FieldSource + ?Sized>(
    source: &S,
    field: &FieldEvaluator,
) -> Result<bool, InternalError> {
    let Operand::Value(operand) = &field.operand else {
        return Err(InternalError::planner_config(format!(
            "residual evaluator on '{}' has an unbound parameter",
            field.field
        )));
    };
    let Some(actual) = source.field_value(&field.field) else {
        return Ok(false);
    };

    let actual = coerce(actual);
    let operand = coerce(operand.clone());

    let matched = match field.kind {
        EvaluatorKind::Equals => loose_eq(&actual, &operand),
        EvaluatorKind::NotEquals => !loose_eq(&actual, &operand),
        EvaluatorKind::GreaterThan => ordered(&actual, &operand, Ordering::is_gt),
        EvaluatorKind::GreaterThanOrEqual => ordered(&actual, &operand, Ordering::is_ge),
        EvaluatorKind::SmallerThan => ordered(&actual, &operand, Ordering::is_lt),
        EvaluatorKind::SmallerThanOrEqual => ordered(&actual, &operand, Ordering::is_le),
        EvaluatorKind::In => membership(&actual, &operand),
        EvaluatorKind::NotIn => !membership(&actual, &operand),
    };

    Ok(matched)
}

fn ordered(actual: &Value, operand: &Value, accept: fn(Ordering) -> bool) -> bool {
    strict_order_cmp(actual, operand).is_some_and(accept)
}

// Collection actual: contains every wanted element (CONTAINS semantics).
// Scalar actual: equal to any listed element (IN-list semantics).
fn membership(actual: &Value, operand: &Value) -> bool {
    match (actual.as_sequence(), operand.as_sequence()) {
        (Some(items), Some(wanted)) => wanted
            .iter()
            .all(|want| items.iter().any(|item| loose_eq(item, want))),
        (Some(items), None) => items.iter().any(|item| loose_eq(item, operand)),
        (None, Some(wanted)) => wanted.iter().any(|want| loose_eq(actual, want)),
        (None, None) => loose_eq(actual, operand),
    }
}
