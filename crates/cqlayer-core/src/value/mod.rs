mod coerce;
mod compare;

#[cfg(test)]
mod tests;

use std::{any::TypeId, fmt};

// re-exports
pub use coerce::coerce;
pub use compare::{canonical_cmp, loose_eq, strict_order_cmp};

///
/// Value
///
/// Dynamic value exchanged between the application model, the planner and
/// the store. Application-only variants (`Enum`, `Type`, `Set`) are lowered
/// by [`coerce`] before a value is bound into a statement.
///
/// Null → the column or field holds no value.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Double(f64),
    Text(String),
    Blob(Vec<u8>),
    /// Milliseconds since the unix epoch.
    Timestamp(i64),
    Enum(ValueEnum),
    Type(TypeRef),
    /// Ordered list of values.
    List(Vec<Self>),
    /// Set of values; canonical order is only guaranteed after coercion.
    Set(Vec<Self>),
    Map(Vec<(Self, Self)>),
}

impl Value {
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// True for list, set and map values.
    #[must_use]
    pub const fn is_collection(&self) -> bool {
        matches!(self, Self::List(_) | Self::Set(_) | Self::Map(_))
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Borrow list or set elements as one ordered slice.
    #[must_use]
    pub fn as_sequence(&self) -> Option<&[Self]> {
        match self {
            Self::List(items) | Self::Set(items) => Some(items),
            _ => None,
        }
    }

    /// Convert list or set values into one ordered sequence.
    #[must_use]
    pub fn into_sequence(self) -> Option<Vec<Self>> {
        match self {
            Self::List(items) | Self::Set(items) => Some(items),
            _ => None,
        }
    }

    pub(crate) const fn canonical_rank(&self) -> u8 {
        match self {
            Self::Null => 0,
            Self::Bool(_) => 1,
            Self::Int(_) | Self::Double(_) => 2,
            Self::Timestamp(_) => 3,
            Self::Text(_) => 4,
            Self::Blob(_) => 5,
            Self::Enum(_) => 6,
            Self::Type(_) => 7,
            Self::List(_) => 8,
            Self::Set(_) => 9,
            Self::Map(_) => 10,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) | Self::Timestamp(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "'{v}'"),
            Self::Blob(bytes) => {
                write!(f, "0x")?;
                for byte in bytes {
                    write!(f, "{byte:02x}")?;
                }
                Ok(())
            }
            Self::Enum(v) => write!(f, "'{}'", v.variant),
            Self::Type(v) => write!(f, "'{}'", v.name()),
            Self::List(items) => write_seq(f, '[', ']', items),
            Self::Set(items) => write_seq(f, '{', '}', items),
            Self::Map(entries) => {
                write!(f, "{{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

fn write_seq(f: &mut fmt::Formatter<'_>, open: char, close: char, items: &[Value]) -> fmt::Result {
    write!(f, "{open}")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    write!(f, "{close}")
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<ValueEnum> for Value {
    fn from(value: ValueEnum) -> Self {
        Self::Enum(value)
    }
}

impl From<TypeRef> for Value {
    fn from(value: TypeRef) -> Self {
        Self::Type(value)
    }
}

impl<T: Into<Self>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

///
/// ValueEnum
///
/// Enumeration value as seen by the layer: the variant label plus the
/// optional path of the enum type it belongs to.
///

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ValueEnum {
    pub variant: String,
    pub path: Option<&'static str>,
}

impl ValueEnum {
    #[must_use]
    pub fn new(variant: impl Into<String>, path: Option<&'static str>) -> Self {
        Self {
            variant: variant.into(),
            path,
        }
    }

    /// Enum value with no type path attached.
    #[must_use]
    pub fn loose(variant: impl Into<String>) -> Self {
        Self::new(variant, None)
    }
}

///
/// TypeRef
///
/// Handle to a Rust type, carried as a value so type-reference columns can
/// round-trip through the store as their fully qualified name.
///

#[derive(Clone, Copy)]
pub struct TypeRef {
    name: &'static str,
    id: TypeId,
}

impl TypeRef {
    #[must_use]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            name: std::any::type_name::<T>(),
            id: TypeId::of::<T>(),
        }
    }

    /// Fully qualified type name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub const fn type_id(&self) -> TypeId {
        self.id
    }
}

impl PartialEq for TypeRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeRef {}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeRef({})", self.name)
    }
}
