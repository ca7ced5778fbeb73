use crate::{
    model::{EnumModel, FieldError},
    value::{TypeRef, Value, ValueEnum},
};
use std::collections::{BTreeMap, BTreeSet};

///
/// FieldValue
///
/// Conversion between a Rust field type and [`Value`].
/// `from_value` returns `None` when the value has the wrong shape.
///

pub trait FieldValue: Sized {
    /// Short type label used in mismatch errors.
    const LABEL: &'static str;

    fn to_value(&self) -> Value;

    fn from_value(value: &Value) -> Option<Self>;
}

/// Decode a value for a setter, reporting mismatches against `field`.
pub fn decode<T: FieldValue>(field: &str, value: &Value) -> Result<T, FieldError> {
    T::from_value(value).ok_or_else(|| FieldError::TypeMismatch {
        field: field.to_string(),
        expected: T::LABEL,
        found: value.to_string(),
    })
}

impl FieldValue for bool {
    const LABEL: &'static str = "bool";

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

impl FieldValue for i64 {
    const LABEL: &'static str = "i64";

    fn to_value(&self) -> Value {
        Value::Int(*self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(v) | Value::Timestamp(v) => Some(*v),
            _ => None,
        }
    }
}

impl FieldValue for i32 {
    const LABEL: &'static str = "i32";

    fn to_value(&self) -> Value {
        Value::Int(i64::from(*self))
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(v) => Self::try_from(*v).ok(),
            _ => None,
        }
    }
}

impl FieldValue for f64 {
    const LABEL: &'static str = "f64";

    fn to_value(&self) -> Value {
        Value::Double(*self)
    }

    #[allow(clippy::cast_precision_loss)]
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Double(v) => Some(*v),
            Value::Int(v) => Some(*v as Self),
            _ => None,
        }
    }
}

impl FieldValue for String {
    const LABEL: &'static str = "text";

    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Text(v) => Some(v.clone()),
            _ => None,
        }
    }
}

impl FieldValue for TypeRef {
    const LABEL: &'static str = "type";

    fn to_value(&self) -> Value {
        Value::Type(*self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Type(v) => Some(*v),
            _ => None,
        }
    }
}

impl<T: FieldValue> FieldValue for Option<T> {
    const LABEL: &'static str = T::LABEL;

    fn to_value(&self) -> Value {
        self.as_ref().map_or(Value::Null, FieldValue::to_value)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: FieldValue> FieldValue for Vec<T> {
    const LABEL: &'static str = "list";

    fn to_value(&self) -> Value {
        Value::List(self.iter().map(FieldValue::to_value).collect())
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_sequence()?.iter().map(T::from_value).collect()
    }
}

impl<T: FieldValue + Ord> FieldValue for BTreeSet<T> {
    const LABEL: &'static str = "set";

    fn to_value(&self) -> Value {
        Value::Set(self.iter().map(FieldValue::to_value).collect())
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_sequence()?.iter().map(T::from_value).collect()
    }
}

impl<K: FieldValue + Ord, V: FieldValue> FieldValue for BTreeMap<K, V> {
    const LABEL: &'static str = "map";

    fn to_value(&self) -> Value {
        Value::Map(
            self.iter()
                .map(|(key, value)| (key.to_value(), value.to_value()))
                .collect(),
        )
    }

    fn from_value(value: &Value) -> Option<Self> {
        let Value::Map(entries) = value else {
            return None;
        };

        entries
            .iter()
            .map(|(key, value)| Some((K::from_value(key)?, V::from_value(value)?)))
            .collect()
    }
}

///
/// EnumValue
///
/// Unit-variant enumerations stored by their variant label.
///

pub trait EnumValue: Sized + 'static {
    const MODEL: &'static EnumModel;

    fn variant(&self) -> &'static str;

    fn from_variant(label: &str) -> Option<Self>;
}

/// Lift an enum field into a value for binding or residual evaluation.
pub fn enum_to_value<E: EnumValue>(value: &E) -> Value {
    Value::Enum(ValueEnum::new(value.variant(), Some(E::MODEL.path)))
}

/// Decode an enum field from a materialized value.
///
/// Accepts the `Enum` value produced by materialization and a bare label.
pub fn enum_from_value<E: EnumValue>(field: &str, value: &Value) -> Result<E, FieldError> {
    let label = match value {
        Value::Enum(value) => value.variant.as_str(),
        Value::Text(label) => label.as_str(),
        other => {
            return Err(FieldError::TypeMismatch {
                field: field.to_string(),
                expected: "enum",
                found: other.to_string(),
            });
        }
    };

    E::from_variant(label).ok_or_else(|| FieldError::UnknownVariant {
        field: field.to_string(),
        path: E::MODEL.path,
        label: label.to_string(),
    })
}
