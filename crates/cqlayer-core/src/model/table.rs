use crate::{
    model::{FieldModel, Record, RecordModel},
    naming::Naming,
};
use std::{
    any::{Any, TypeId},
    collections::{BTreeMap, HashMap},
    sync::{Arc, Mutex, PoisonError},
};

///
/// ColumnTable
///
/// Normalized column name → field model, built once per record type.
/// Columns with no entry are ignored during materialization.
///

pub struct ColumnTable<R: 'static> {
    model: &'static RecordModel<R>,
    resource: String,
    columns: Vec<String>,
    by_column: BTreeMap<String, usize>,
}

impl<R: Record> ColumnTable<R> {
    #[must_use]
    pub fn build(naming: &dyn Naming) -> Self {
        let model = R::model();
        let columns: Vec<String> = model
            .fields
            .iter()
            .map(|field| naming.normalize(field.name))
            .collect();
        let by_column = columns
            .iter()
            .enumerate()
            .map(|(slot, column)| (column.clone(), slot))
            .collect();

        Self {
            model,
            resource: naming.normalize(model.resource),
            columns,
            by_column,
        }
    }
}

impl<R: 'static> ColumnTable<R> {
    /// Normalized resource (table) name.
    #[must_use]
    pub fn resource(&self) -> &str {
        &self.resource
    }

    #[must_use]
    pub const fn model(&self) -> &'static RecordModel<R> {
        self.model
    }

    #[must_use]
    pub fn field(&self, column: &str) -> Option<&'static FieldModel<R>> {
        let model = self.model;

        self.by_column.get(column).map(|slot| &model.fields[*slot])
    }

    /// Columns with their field models, in field declaration order.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &'static FieldModel<R>)> {
        let model = self.model;

        self.columns
            .iter()
            .zip(model.fields.iter())
            .map(|(column, field)| (column.as_str(), field))
    }
}

///
/// ModelRegistry
///
/// Cache of column tables keyed by record type. Owned by the storage layer
/// and shared by every session it opens.
///

#[derive(Default)]
pub struct ModelRegistry {
    tables: Mutex<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
}

impl ModelRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached table for `R`, building it on first use.
    pub fn table<R: Record>(&self, naming: &dyn Naming) -> Arc<ColumnTable<R>> {
        let mut tables = self.tables.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(table) = tables.get(&TypeId::of::<R>())
            && let Ok(table) = Arc::clone(table).downcast::<ColumnTable<R>>()
        {
            return table;
        }

        let table = Arc::new(ColumnTable::<R>::build(naming));
        tables.insert(TypeId::of::<R>(), table.clone());

        table
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tables
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
