use crate::value::Value;
use std::cmp::Ordering;

/// Total canonical comparator used for set and map-key normalization.
///
/// Ordering rules:
/// 1. Canonical variant rank
/// 2. Variant-specific comparison for same-ranked values
///
/// Mixed-variant comparisons are rank-only and must remain deterministic.
#[must_use]
pub fn canonical_cmp(left: &Value, right: &Value) -> Ordering {
    let rank = left.canonical_rank().cmp(&right.canonical_rank());
    if rank != Ordering::Equal {
        return rank;
    }

    canonical_cmp_same_rank(left, right)
}

/// Strict comparator for orderable values.
///
/// Integers and doubles compare numerically; every other pairing must be
/// the same variant. Returns `None` for mismatched or non-orderable values.
#[must_use]
pub fn strict_order_cmp(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Bool(a), Value::Bool(b)) => a.partial_cmp(b),
        (Value::Int(a), Value::Int(b)) | (Value::Timestamp(a), Value::Timestamp(b)) => {
            a.partial_cmp(b)
        }
        (Value::Double(a), Value::Double(b)) => a.partial_cmp(b),
        #[allow(clippy::cast_precision_loss)]
        (Value::Int(a), Value::Double(b)) => (*a as f64).partial_cmp(b),
        #[allow(clippy::cast_precision_loss)]
        (Value::Double(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),
        (Value::Text(a), Value::Text(b)) => a.partial_cmp(b),
        (Value::Blob(a), Value::Blob(b)) => a.partial_cmp(b),
        (Value::Enum(a), Value::Enum(b)) => a.variant.partial_cmp(&b.variant),
        _ => None,
    }
}

/// Equality used by residual evaluation.
///
/// Numeric variants compare by value, sets ignore element order, everything
/// else requires structural equality.
#[must_use]
pub fn loose_eq(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Int(_), Value::Double(_)) | (Value::Double(_), Value::Int(_)) => {
            strict_order_cmp(left, right) == Some(Ordering::Equal)
        }
        (Value::Enum(a), Value::Enum(b)) => a.variant == b.variant,
        (Value::Set(a), Value::Set(b)) => {
            a.len() == b.len() && a.iter().all(|item| b.iter().any(|other| loose_eq(item, other)))
        }
        (Value::List(a), Value::List(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| loose_eq(x, y))
        }
        _ => left == right,
    }
}

fn canonical_cmp_same_rank(left: &Value, right: &Value) -> Ordering {
    #[allow(clippy::match_same_arms)]
    match (left, right) {
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Int(a), Value::Int(b)) | (Value::Timestamp(a), Value::Timestamp(b)) => a.cmp(b),
        (Value::Double(a), Value::Double(b)) => a.total_cmp(b),
        #[allow(clippy::cast_precision_loss)]
        (Value::Int(a), Value::Double(b)) => (*a as f64).total_cmp(b),
        #[allow(clippy::cast_precision_loss)]
        (Value::Double(a), Value::Int(b)) => a.total_cmp(&(*b as f64)),
        (Value::Text(a), Value::Text(b)) => a.cmp(b),
        (Value::Blob(a), Value::Blob(b)) => a.cmp(b),
        (Value::Enum(a), Value::Enum(b)) => a.cmp(b),
        (Value::Type(a), Value::Type(b)) => a.name().cmp(b.name()),
        (Value::List(a), Value::List(b)) | (Value::Set(a), Value::Set(b)) => {
            canonical_cmp_seq(a, b)
        }
        (Value::Map(a), Value::Map(b)) => canonical_cmp_map(a, b),
        (Value::Null, Value::Null) => Ordering::Equal,
        _ => Ordering::Equal,
    }
}

fn canonical_cmp_seq(left: &[Value], right: &[Value]) -> Ordering {
    for (left, right) in left.iter().zip(right.iter()) {
        let cmp = canonical_cmp(left, right);
        if cmp != Ordering::Equal {
            return cmp;
        }
    }

    left.len().cmp(&right.len())
}

fn canonical_cmp_map(left: &[(Value, Value)], right: &[(Value, Value)]) -> Ordering {
    for ((left_key, left_value), (right_key, right_value)) in left.iter().zip(right.iter()) {
        let key_cmp = canonical_cmp(left_key, right_key);
        if key_cmp != Ordering::Equal {
            return key_cmp;
        }

        let value_cmp = canonical_cmp(left_value, right_value);
        if value_cmp != Ordering::Equal {
            return value_cmp;
        }
    }

    left.len().cmp(&right.len())
}
