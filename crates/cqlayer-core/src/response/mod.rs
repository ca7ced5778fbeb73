//! Operation results.

#[cfg(test)]
mod tests;

use crate::{
    error::{ErrorClass, ErrorOrigin, InternalError},
    naming::Naming,
    value::Value,
};
use derive_more::IntoIterator;
use thiserror::Error as ThisError;

///
/// ResponseError
/// Errors related to interpreting a result's cardinality.
///

#[derive(Debug, ThisError)]
pub enum ResponseError {
    #[error("expected at most one row, found {count}")]
    NotUnique { count: usize },
}

impl From<ResponseError> for InternalError {
    fn from(err: ResponseError) -> Self {
        Self::new(ErrorClass::Mapping, ErrorOrigin::Session, err.to_string())
    }
}

///
/// ResultSet
///
/// Shape of an operation's result. Typed reads pick `Empty`, `Single` or
/// `Collection` by row count; untyped operations always return `MapRows`.
///

#[derive(Clone, Debug, PartialEq)]
pub enum ResultSet<R = RowMap> {
    Empty,
    Single(R),
    Collection(Vec<R>),
    MapRows(Vec<RowMap>),
}

impl<R> ResultSet<R> {
    /// 0 items → `Empty`, 1 → `Single`, more → `Collection`.
    #[must_use]
    pub fn shaped(mut items: Vec<R>) -> Self {
        match items.len() {
            0 => Self::Empty,
            1 => items.pop().map_or(Self::Empty, Self::Single),
            _ => Self::Collection(items),
        }
    }

    #[must_use]
    pub const fn map_rows(rows: Vec<RowMap>) -> Self {
        Self::MapRows(rows)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Single(_) => 1,
            Self::Collection(items) => items.len(),
            Self::MapRows(rows) => rows.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Typed items; `MapRows` yields nothing.
    #[must_use]
    pub fn into_items(self) -> Vec<R> {
        match self {
            Self::Empty | Self::MapRows(_) => Vec::new(),
            Self::Single(item) => vec![item],
            Self::Collection(items) => items,
        }
    }

    /// Row maps; typed shapes yield nothing.
    #[must_use]
    pub fn into_rows(self) -> Vec<RowMap> {
        match self {
            Self::MapRows(rows) => rows,
            Self::Empty | Self::Single(_) | Self::Collection(_) => Vec::new(),
        }
    }

    /// Require at most one typed item.
    pub fn one_opt(self) -> Result<Option<R>, InternalError> {
        let count = self.len();
        if count > 1 {
            return Err(ResponseError::NotUnique { count }.into());
        }

        Ok(self.into_items().pop())
    }
}

///
/// RowMap
///
/// Ordered field → value map for untyped results, keyed by normalized
/// column names (or aliases).
///

#[derive(Clone, Debug, Default, IntoIterator, PartialEq)]
pub struct RowMap(#[into_iterator(owned, ref)] Vec<(String, Value)>);

impl RowMap {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Insert or replace; a replaced entry keeps its position.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();

        match self.0.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => *existing = value,
            None => self.0.push((name, value)),
        }
    }

    /// Re-key every entry by its application field name.
    #[must_use]
    pub fn denormalize(self, naming: &dyn Naming) -> Self {
        self.0
            .into_iter()
            .map(|(column, value)| (naming.denormalize(&column), value))
            .collect()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, Value)> for RowMap {
    fn from_iter<I: IntoIterator<Item = (S, Value)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (name, value) in iter {
            map.insert(name, value);
        }

        map
    }
}
