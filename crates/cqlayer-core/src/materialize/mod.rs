//! Row → record / row-map materialization and residual-filter sources.


use crate::{
    error::InternalError,
    model::{ColumnTable, FieldError, FieldKind, FieldModel, Record, TypeRegistry},
    naming::Naming,
    query::{Evaluator, FieldSource, ReturnField},
    response::RowMap,
    transport::Row,
    value::{Value, ValueEnum},
};
use tracing::warn;

///
/// PostEvaluation
///
/// Where the residual predicate runs: on native rows before
/// materialization, or on the materialized records / row maps.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum PostEvaluation {
    #[default]
    RawRows,
    Materialized,
}

///
/// Materializer
///

pub struct Materializer<'a> {
    naming: &'a dyn Naming,
    types: &'a TypeRegistry,
}

impl<'a> Materializer<'a> {
    #[must_use]
    pub const fn new(naming: &'a dyn Naming, types: &'a TypeRegistry) -> Self {
        Self { naming, types }
    }

    /// Build a record from `(column, value)` pairs.
    ///
    /// Null values and columns without a field are skipped. A value that
    /// cannot be lifted or assigned is logged and the field left unset.
    pub fn record<'v, R: Record>(
        &self,
        table: &ColumnTable<R>,
        columns: impl IntoIterator<Item = (&'v str, &'v Value)>,
    ) -> R {
        let mut record = R::default();
        self.assign(table, &mut record, columns);

        record
    }

    /// Assign `(column, value)` pairs onto an existing record.
    pub fn assign<'v, R: Record>(
        &self,
        table: &ColumnTable<R>,
        record: &mut R,
        columns: impl IntoIterator<Item = (&'v str, &'v Value)>,
    ) {
        for (column, value) in columns {
            if value.is_null() {
                continue;
            }
            let Some(field) = table.field(&self.naming.normalize(column)) else {
                continue;
            };

            let assigned = self
                .lift(field, value)
                .and_then(|lifted| (field.set)(record, lifted));
            if let Err(err) = assigned {
                warn!(
                    resource = table.resource(),
                    field = field.name,
                    error = %err,
                    "field left unset during materialization"
                );
            }
        }
    }

    pub fn record_from_row<R: Record>(&self, table: &ColumnTable<R>, row: &Row) -> R {
        self.record(table, row.columns())
    }

    pub fn record_from_map<R: Record>(&self, table: &ColumnTable<R>, map: &RowMap) -> R {
        self.record(table, map.iter())
    }

    /// Native row → row map keyed by normalized column names.
    #[must_use]
    pub fn row_map(&self, row: Row) -> RowMap {
        row.into_columns()
            .into_iter()
            .map(|(column, value)| (self.naming.normalize(&column), value))
            .collect()
    }

    /// Apply a deferred projection, renaming aliased fields.
    #[must_use]
    pub fn project(&self, map: &RowMap, fields: &[ReturnField]) -> RowMap {
        let mut projected = RowMap::new();
        for field in fields {
            let column = self.naming.normalize(&field.name);
            let Some(value) = map.get(&column) else {
                continue;
            };
            let key = field
                .alias
                .as_deref()
                .map_or_else(|| column.clone(), |alias| self.naming.normalize(alias));

            projected.insert(key, value.clone());
        }

        projected
    }

    // Lift a stored value into the field's domain before its setter runs.
    fn lift<R>(&self, field: &FieldModel<R>, value: &Value) -> Result<Value, FieldError> {
        match field.kind {
            FieldKind::Scalar => Ok(value.clone()),
            FieldKind::Enum(model) => {
                let label = match value {
                    Value::Text(label) => label.as_str(),
                    Value::Enum(value) => value.variant.as_str(),
                    other => return Err(mismatch(field.name, "enum label", other)),
                };
                if !model.contains(label) {
                    return Err(FieldError::UnknownVariant {
                        field: field.name.to_string(),
                        path: model.path,
                        label: label.to_string(),
                    });
                }

                Ok(Value::Enum(ValueEnum::new(label, Some(model.path))))
            }
            FieldKind::TypeRef => match value {
                Value::Type(type_ref) => Ok(Value::Type(*type_ref)),
                Value::Text(name) => self.types.resolve(name).map(Value::Type).ok_or_else(|| {
                    FieldError::UnresolvedType {
                        field: field.name.to_string(),
                        name: name.clone(),
                    }
                }),
                other => Err(mismatch(field.name, "type name", other)),
            },
        }
    }
}

fn mismatch(field: &str, expected: &'static str, found: &Value) -> FieldError {
    FieldError::TypeMismatch {
        field: field.to_string(),
        expected,
        found: found.to_string(),
    }
}

/// Fail when a residual predicate names a field the record does not have.
pub fn check_residual_fields<R: Record>(
    table: &ColumnTable<R>,
    predicate: &[Evaluator],
    naming: &dyn Naming,
) -> Result<(), InternalError> {
    for evaluator in predicate {
        match evaluator {
            Evaluator::Field(field) => {
                if table.field(&naming.normalize(&field.field)).is_none() {
                    return Err(FieldError::UnknownField {
                        field: field.field.clone(),
                        resource: table.model().resource,
                    }
                    .into());
                }
            }
            Evaluator::And(children) | Evaluator::Or(children) => {
                check_residual_fields(table, children, naming)?;
            }
        }
    }

    Ok(())
}

///
/// RowSource
/// Residual source over a native row.
///

pub struct RowSource<'a> {
    pub row: &'a Row,
    pub naming: &'a dyn Naming,
}

impl FieldSource for RowSource<'_> {
    fn field_value(&self, field: &str) -> Option<Value> {
        self.row.get(&self.naming.normalize(field)).cloned()
    }
}

///
/// MapSource
///

pub struct MapSource<'a> {
    pub map: &'a RowMap,
    pub naming: &'a dyn Naming,
}

impl FieldSource for MapSource<'_> {
    fn field_value(&self, field: &str) -> Option<Value> {
        self.map.get(&self.naming.normalize(field)).cloned()
    }
}

///
/// RecordSource
/// Residual source over a materialized record, read through its getters.
///

pub struct RecordSource<'a, R: 'static> {
    pub record: &'a R,
    pub table: &'a ColumnTable<R>,
    pub naming: &'a dyn Naming,
}

impl<R: 'static> FieldSource for RecordSource<'_, R> {
    fn field_value(&self, field: &str) -> Option<Value> {
        self.table
            .field(&self.naming.normalize(field))
            .map(|model| (model.get)(self.record))
    }
}
