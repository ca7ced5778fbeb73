//! Transport boundary: executes parameterized statements against the store.

use crate::{
    config::ClusterConfig,
    error::{ErrorClass, ErrorOrigin, InternalError},
    statement::Statement,
    value::Value,
};
use std::sync::Arc;
use thiserror::Error as ThisError;

///
/// Transport
///
/// Synchronous statement executor shared by every session of a layer.
/// Implementations must be safe for concurrent use.
///

pub trait Transport: Send + Sync {
    fn execute(&self, statement: &Statement) -> Result<Vec<Row>, TransportError>;

    /// Prepare a statement ahead of execution. Optional; the default does
    /// nothing beyond echoing the statement text.
    fn prepare(&self, cql: &str) -> Result<PreparedHandle, TransportError> {
        Ok(PreparedHandle::new(cql))
    }

    /// True once the underlying connection pool has been shut down.
    fn is_closed(&self) -> bool {
        false
    }
}

///
/// TransportConnector
/// Builds the shared transport from cluster configuration.
///

pub trait TransportConnector: Send + Sync {
    fn connect(&self, config: &ClusterConfig) -> Result<Arc<dyn Transport>, TransportError>;
}

///
/// PreparedHandle
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PreparedHandle {
    pub cql: String,
}

impl PreparedHandle {
    #[must_use]
    pub fn new(cql: impl Into<String>) -> Self {
        Self { cql: cql.into() }
    }
}

///
/// Row
///
/// One native row: column names as reported by the store, in result order.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Row {
    columns: Vec<(String, Value)>,
}

impl Row {
    #[must_use]
    pub const fn new(columns: Vec<(String, Value)>) -> Self {
        Self { columns }
    }

    #[must_use]
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(name, value)| (name.as_str(), value))
    }

    #[must_use]
    pub fn into_columns(self) -> Vec<(String, Value)> {
        self.columns
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (S, Value)>>(iter: I) -> Self {
        Self::new(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        )
    }
}

///
/// TransportError
///

#[derive(Debug, ThisError)]
pub enum TransportError {
    #[error("unable to connect: {message}")]
    Connect { message: String },

    #[error("statement rejected by the store: {message}")]
    Rejected { message: String },

    #[error("transport closed")]
    Closed,

    #[error("request failed: {message}")]
    Request { message: String },
}

impl From<TransportError> for InternalError {
    fn from(err: TransportError) -> Self {
        Self::new(
            ErrorClass::Access,
            ErrorOrigin::Transport,
            format!("statement execution failed: {err}"),
        )
        .with_source(err)
    }
}
