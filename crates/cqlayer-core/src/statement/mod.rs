//! Native statement construction.
//!
//! Builders are pure: they read catalog metadata and produce a [`Statement`]
//! (CQL text plus ordered bind values) without touching the transport.

mod delete;
mod insert;
mod select;
mod update;


use crate::value::{Value, coerce};
use derive_more::{Deref, IntoIterator};
use std::fmt::Write as _;

// re-exports
pub use delete::DeleteTemplate;
pub use insert::build_insert;
pub use select::{Projection, SelectStatement, build_select};
pub use update::UpdateTemplate;

///
/// Statement
///
/// Parameterized native statement. Every bound value is coerced on entry.
///

#[derive(Clone, Debug, PartialEq)]
pub struct Statement {
    cql: String,
    values: Vec<Value>,
}

impl Statement {
    #[must_use]
    pub fn new(cql: impl Into<String>) -> Self {
        Self {
            cql: cql.into(),
            values: Vec::new(),
        }
    }

    #[must_use]
    pub fn bind(mut self, value: Value) -> Self {
        self.push(value);
        self
    }

    pub fn push(&mut self, value: Value) {
        self.values.push(coerce(value));
    }

    #[must_use]
    pub fn cql(&self) -> &str {
        &self.cql
    }

    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// CQL with every placeholder replaced by its bound value, for logs.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.cql.len());
        let mut values = self.values.iter();

        for ch in self.cql.chars() {
            if ch == '?' {
                match values.next() {
                    Some(value) => {
                        let _ = write!(out, "{value}");
                    }
                    None => out.push(ch),
                }
            } else {
                out.push(ch);
            }
        }

        out
    }
}

///
/// StorageValue
/// One pending field value for an insert or update.
///

#[derive(Clone, Debug, PartialEq)]
pub struct StorageValue {
    pub name: String,
    pub value: Value,
}

impl StorageValue {
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

///
/// StorageValues
///
/// Ordered, name-keyed pending values. Setting a name twice replaces the
/// earlier value in place.
///

#[derive(Clone, Debug, Default, Deref, IntoIterator, PartialEq)]
pub struct StorageValues(#[into_iterator(owned, ref)] Vec<StorageValue>);

impl StorageValues {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let entry = StorageValue::new(name, value);

        match self.0.iter_mut().find(|existing| existing.name == entry.name) {
            Some(existing) => existing.value = entry.value,
            None => self.0.push(entry),
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| &entry.value)
    }
}

impl<S: Into<String>, V: Into<Value>> FromIterator<(S, V)> for StorageValues {
    fn from_iter<I: IntoIterator<Item = (S, V)>>(iter: I) -> Self {
        let mut values = Self::new();
        for (name, value) in iter {
            values.set(name, value);
        }

        values
    }
}

// `k1 = ? AND k2 = ?` over the given key columns.
fn key_predicate(keys: &[String]) -> String {
    keys.iter()
        .map(|key| format!("{key} = ?"))
        .collect::<Vec<_>>()
        .join(" AND ")
}
