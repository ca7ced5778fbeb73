//! Explicit per-record field models.
//!
//! A record type describes its fields once, in a `static` [`RecordModel`];
//! the layer never inspects a record any other way.

mod field_value;
mod table;


use crate::{
    error::InternalError,
    value::{TypeRef, Value},
};
use std::{
    collections::BTreeMap,
    sync::{PoisonError, RwLock},
};
use thiserror::Error as ThisError;

// re-exports
pub use field_value::{EnumValue, FieldValue, decode, enum_from_value, enum_to_value};
pub use table::{ColumnTable, ModelRegistry};

///
/// Record
///
/// A typed row. `Default` supplies the blank instance that materialization
/// fills field by field.
///

pub trait Record: Default + Send + Sync + 'static {
    fn model() -> &'static RecordModel<Self>;
}

///
/// RecordModel
///

pub struct RecordModel<R: 'static> {
    /// Application-level resource name; normalized into the table name.
    pub resource: &'static str,
    /// Ordered field list; insert column order follows it.
    pub fields: &'static [FieldModel<R>],
}

impl<R: 'static> RecordModel<R> {
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldModel<R>> {
        self.fields.iter().find(|field| field.name == name)
    }
}

///
/// FieldModel
/// Name, kind and accessor pair for one record field.
///

pub struct FieldModel<R> {
    /// Field name in the application convention.
    pub name: &'static str,
    pub kind: FieldKind,
    pub get: fn(&R) -> Value,
    pub set: fn(&mut R, Value) -> Result<(), FieldError>,
}

///
/// FieldKind
///
/// How a stored value is lifted back into the field's domain before the
/// setter runs.
///

#[derive(Clone, Copy, Debug)]
pub enum FieldKind {
    Scalar,
    Enum(&'static EnumModel),
    TypeRef,
}

///
/// EnumModel
///

#[derive(Debug)]
pub struct EnumModel {
    pub path: &'static str,
    pub variants: &'static [&'static str],
}

impl EnumModel {
    #[must_use]
    pub fn contains(&self, label: &str) -> bool {
        self.variants.contains(&label)
    }
}

///
/// FieldError
/// Failure to assign one field of one record.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum FieldError {
    #[error("field '{field}': unknown variant '{label}' for enum {path}")]
    UnknownVariant {
        field: String,
        path: &'static str,
        label: String,
    },

    #[error("field '{field}': unresolvable type name '{name}'")]
    UnresolvedType { field: String, name: String },

    #[error("field '{field}': expected {expected}, found {found}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        found: String,
    },

    #[error("field '{field}' is not part of record {resource}")]
    UnknownField { field: String, resource: &'static str },
}

impl From<FieldError> for InternalError {
    fn from(err: FieldError) -> Self {
        Self::mapping(err.to_string())
    }
}

///
/// TypeRegistry
///
/// Known types by fully qualified name, used to resolve type-reference
/// columns on read.
///

#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: RwLock<BTreeMap<&'static str, TypeRef>>,
}

impl TypeRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<T: ?Sized + 'static>(&self) -> TypeRef {
        let type_ref = TypeRef::of::<T>();
        self.types
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(type_ref.name(), type_ref);

        type_ref
    }

    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<TypeRef> {
        self.types
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .copied()
    }
}
