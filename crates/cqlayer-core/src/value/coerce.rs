//! Lowering of application values into values the statement binder accepts.

use crate::value::{Value, canonical_cmp};
use std::cmp::Ordering;

/// Coerce one application value into its native representation.
///
/// - enums bind as their variant label
/// - type references bind as their fully qualified type name
/// - lists are coerced element-wise, order preserved
/// - sets are coerced element-wise, then sorted and de-duplicated so the store
///   always receives canonical ordering
/// - maps are coerced entry-wise and sorted by key
#[must_use]
pub fn coerce(value: Value) -> Value {
    match value {
        Value::Enum(value) => Value::Text(value.variant),
        Value::Type(type_ref) => Value::Text(type_ref.name().to_string()),
        Value::List(items) => Value::List(items.into_iter().map(coerce).collect()),
        Value::Set(items) => {
            let mut items: Vec<Value> = items.into_iter().map(coerce).collect();
            items.sort_by(canonical_cmp);
            items.dedup_by(|a, b| canonical_cmp(a, b) == Ordering::Equal);

            Value::Set(items)
        }
        Value::Map(entries) => {
            let mut entries: Vec<(Value, Value)> = entries
                .into_iter()
                .map(|(key, value)| (coerce(key), coerce(value)))
                .collect();
            entries.sort_by(|(left, _), (right, _)| canonical_cmp(left, right));

            Value::Map(entries)
        }
        other => other,
    }
}
