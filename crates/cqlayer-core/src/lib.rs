//! Core runtime for cqlayer: query predicates, pushdown planning, native
//! statement building and record materialization over a partition-oriented
//! wide-column store.

// public exports are one module level down
pub mod catalog;
pub mod config;
pub mod error;
pub mod layer;
pub mod materialize;
pub mod model;
pub mod naming;
pub mod plan;
pub mod query;
pub mod response;
pub mod session;
pub mod statement;
pub mod transport;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_support;

///
/// Prelude
///
/// Vocabulary needed to describe records and issue queries.
/// Catalog implementations, transports and planner internals stay in their
/// modules.
///

pub mod prelude {
    pub use crate::{
        layer::StorageLayer,
        model::{EnumValue, FieldKind, FieldModel, FieldValue, Record, RecordModel},
        query::{Evaluator, Query},
        response::{ResultSet, RowMap},
        session::{Mutation, StorageSession},
        statement::StorageValues,
        value::Value,
    };
}
