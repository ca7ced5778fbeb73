//! Read-only schema metadata consumed by the planner and statement builders.

mod memory;


use crate::error::{ErrorClass, ErrorOrigin, InternalError};
use derive_more::Display;
use thiserror::Error as ThisError;

// re-exports
pub use memory::{InMemoryCatalog, TableSchema};

///
/// SchemaCatalog
///
/// Metadata accessor for one keyspace. Resource and column names passed in
/// are already normalized.
///

pub trait SchemaCatalog: Send + Sync {
    fn column_exists(&self, resource: &str, column: &str) -> Result<bool, CatalogError>;

    /// Partition-key columns in declaration order.
    fn partition_keys(&self, resource: &str) -> Result<Vec<String>, CatalogError>;

    /// Clustering-key columns in declaration order.
    fn clustering_keys(&self, resource: &str) -> Result<Vec<String>, CatalogError>;

    /// Columns covered by a secondary index.
    fn indexed_columns(&self, resource: &str) -> Result<Vec<String>, CatalogError>;

    fn column_type(&self, resource: &str, column: &str) -> Result<ColumnType, CatalogError>;

    /// Partition keys followed by clustering keys: the full row key.
    fn row_keys(&self, resource: &str) -> Result<Vec<String>, CatalogError> {
        let mut keys = self.partition_keys(resource)?;
        keys.extend(self.clustering_keys(resource)?);

        Ok(keys)
    }

    /// Every pushdown-capable column: partition ++ clustering ++ indexed.
    fn pushdown_keys(&self, resource: &str) -> Result<Vec<String>, CatalogError> {
        let mut keys = self.row_keys(resource)?;
        for column in self.indexed_columns(resource)? {
            if !keys.contains(&column) {
                keys.push(column);
            }
        }

        Ok(keys)
    }
}

///
/// ColumnType
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ColumnType {
    pub native: NativeType,
}

impl ColumnType {
    #[must_use]
    pub const fn new(native: NativeType) -> Self {
        Self { native }
    }

    #[must_use]
    pub const fn is_collection(&self) -> bool {
        self.native.is_collection()
    }
}

///
/// NativeType
/// Column types of the wide-column store.
///

#[derive(Clone, Debug, Display, Eq, PartialEq)]
pub enum NativeType {
    #[display("ascii")]
    Ascii,
    #[display("bigint")]
    BigInt,
    #[display("blob")]
    Blob,
    #[display("boolean")]
    Boolean,
    #[display("double")]
    Double,
    #[display("int")]
    Int,
    #[display("text")]
    Text,
    #[display("timestamp")]
    Timestamp,
    #[display("uuid")]
    Uuid,
    #[display("list<{_0}>")]
    List(Box<Self>),
    #[display("set<{_0}>")]
    Set(Box<Self>),
    #[display("map<{_0}, {_1}>")]
    Map(Box<Self>, Box<Self>),
}

impl NativeType {
    #[must_use]
    pub const fn is_collection(&self) -> bool {
        matches!(self, Self::List(_) | Self::Set(_) | Self::Map(..))
    }
}

///
/// CatalogError
///

#[derive(Debug, ThisError)]
pub enum CatalogError {
    #[error("resource not found: {resource}")]
    ResourceNotFound { resource: String },

    #[error("column not found: {resource}.{column}")]
    ColumnNotFound { resource: String, column: String },
}

impl From<CatalogError> for InternalError {
    fn from(err: CatalogError) -> Self {
        Self::new(ErrorClass::Schema, ErrorOrigin::Catalog, err.to_string())
    }
}

/// Unwrap a secondary-index target expression to the column it covers.
///
/// Collection indexes are reported as `values(col)`, `keys(col)`,
/// `entries(col)` or `full(col)`; plain indexes report the bare column.
#[must_use]
pub fn index_target_column(target: &str) -> &str {
    let target = target.trim();

    for wrapper in ["values", "keys", "entries", "full"] {
        if let Some(inner) = target
            .strip_prefix(wrapper)
            .and_then(|rest| rest.strip_prefix('('))
            .and_then(|rest| rest.strip_suffix(')'))
        {
            return inner.trim();
        }
    }

    target
}
