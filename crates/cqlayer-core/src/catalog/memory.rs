use crate::catalog::{CatalogError, ColumnType, NativeType, SchemaCatalog, index_target_column};
use std::collections::BTreeMap;

///
/// TableSchema
///
/// Declarative description of one table (or materialized view).
///

#[derive(Clone, Debug, Default)]
pub struct TableSchema {
    name: String,
    columns: Vec<(String, NativeType)>,
    partition_keys: Vec<String>,
    clustering_keys: Vec<String>,
    indexes: Vec<String>,
}

impl TableSchema {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn partition_key(mut self, column: impl Into<String>, native: NativeType) -> Self {
        let column = column.into();
        self.partition_keys.push(column.clone());
        self.columns.push((column, native));
        self
    }

    #[must_use]
    pub fn clustering_key(mut self, column: impl Into<String>, native: NativeType) -> Self {
        let column = column.into();
        self.clustering_keys.push(column.clone());
        self.columns.push((column, native));
        self
    }

    #[must_use]
    pub fn column(mut self, column: impl Into<String>, native: NativeType) -> Self {
        self.columns.push((column.into(), native));
        self
    }

    /// Register a secondary index by its target expression,
    /// e.g. `email` or `values(tags)`.
    #[must_use]
    pub fn index(mut self, target: &str) -> Self {
        self.indexes.push(index_target_column(target).to_string());
        self
    }

    fn native_type(&self, column: &str) -> Option<&NativeType> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, native)| native)
    }
}

///
/// InMemoryCatalog
///

#[derive(Clone, Debug, Default)]
pub struct InMemoryCatalog {
    tables: BTreeMap<String, TableSchema>,
}

impl InMemoryCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_table(mut self, table: TableSchema) -> Self {
        self.insert(table);
        self
    }

    pub fn insert(&mut self, table: TableSchema) {
        self.tables.insert(table.name.clone(), table);
    }

    fn table(&self, resource: &str) -> Result<&TableSchema, CatalogError> {
        self.tables
            .get(resource)
            .ok_or_else(|| CatalogError::ResourceNotFound {
                resource: resource.to_string(),
            })
    }
}

impl SchemaCatalog for InMemoryCatalog {
    fn column_exists(&self, resource: &str, column: &str) -> Result<bool, CatalogError> {
        Ok(self.table(resource)?.native_type(column).is_some())
    }

    fn partition_keys(&self, resource: &str) -> Result<Vec<String>, CatalogError> {
        Ok(self.table(resource)?.partition_keys.clone())
    }

    fn clustering_keys(&self, resource: &str) -> Result<Vec<String>, CatalogError> {
        Ok(self.table(resource)?.clustering_keys.clone())
    }

    fn indexed_columns(&self, resource: &str) -> Result<Vec<String>, CatalogError> {
        Ok(self.table(resource)?.indexes.clone())
    }

    fn column_type(&self, resource: &str, column: &str) -> Result<ColumnType, CatalogError> {
        self.table(resource)?
            .native_type(column)
            .cloned()
            .map(ColumnType::new)
            .ok_or_else(|| CatalogError::ColumnNotFound {
                resource: resource.to_string(),
                column: column.to_string(),
            })
    }
}
