use crate::{catalog::SchemaCatalog, error::InternalError};
use std::collections::BTreeSet;

///
/// KeyMetadata
///
/// Key layout of one resource as seen by the planner and the statement
/// builders. All column names are normalized.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct KeyMetadata {
    partition: Vec<String>,
    clustering: Vec<String>,
    indexed: Vec<String>,
    collections: BTreeSet<String>,
}

impl KeyMetadata {
    #[must_use]
    pub fn new(partition: Vec<String>, clustering: Vec<String>, indexed: Vec<String>) -> Self {
        Self {
            partition,
            clustering,
            indexed,
            collections: BTreeSet::new(),
        }
    }

    /// Mark a pushdown column as collection-typed.
    #[must_use]
    pub fn with_collection(mut self, column: impl Into<String>) -> Self {
        self.collections.insert(column.into());
        self
    }

    /// Load key layout and collection flags for `resource` from the catalog.
    pub fn resolve(catalog: &dyn SchemaCatalog, resource: &str) -> Result<Self, InternalError> {
        let mut keys = Self::new(
            catalog.partition_keys(resource)?,
            catalog.clustering_keys(resource)?,
            catalog.indexed_columns(resource)?,
        );

        for column in keys.pushdown_keys() {
            if catalog.column_type(resource, &column)?.is_collection() {
                keys.collections.insert(column);
            }
        }

        Ok(keys)
    }

    #[must_use]
    pub fn partition_keys(&self) -> &[String] {
        &self.partition
    }

    #[must_use]
    pub fn clustering_keys(&self) -> &[String] {
        &self.clustering
    }

    /// Partition keys followed by clustering keys.
    #[must_use]
    pub fn row_keys(&self) -> Vec<String> {
        self.partition
            .iter()
            .chain(&self.clustering)
            .cloned()
            .collect()
    }

    /// Row keys followed by indexed columns not already listed.
    #[must_use]
    pub fn pushdown_keys(&self) -> Vec<String> {
        let mut keys = self.row_keys();
        for column in &self.indexed {
            if !keys.contains(column) {
                keys.push(column.clone());
            }
        }

        keys
    }

    #[must_use]
    pub fn is_row_key(&self, column: &str) -> bool {
        self.partition.iter().chain(&self.clustering).any(|key| key == column)
    }

    #[must_use]
    pub fn is_pushdown_key(&self, column: &str) -> bool {
        self.is_row_key(column) || self.indexed.iter().any(|key| key == column)
    }

    #[must_use]
    pub fn is_collection(&self, column: &str) -> bool {
        self.collections.contains(column)
    }
}
