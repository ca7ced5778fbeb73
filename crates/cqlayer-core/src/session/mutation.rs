use crate::{query::Query, response::RowMap, statement::StorageValues, value::Value};

///
/// Mutation
///
/// Scope and payload of an update or delete: explicit instances, or a query
/// whose matching rows are mutated one by one. Untyped mutations operate on
/// [`RowMap`] instances and need a resource name (given here or through the
/// query).
///

#[derive(Clone, Debug)]
pub struct Mutation<R = RowMap> {
    pub(crate) resource: Option<String>,
    pub(crate) instances: Vec<R>,
    pub(crate) query: Option<Query>,
    pub(crate) values: StorageValues,
}

impl<R> Default for Mutation<R> {
    fn default() -> Self {
        Self {
            resource: None,
            instances: Vec::new(),
            query: None,
            values: StorageValues::new(),
        }
    }
}

impl<R> Mutation<R> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scope to a single instance.
    #[must_use]
    pub fn of(instance: R) -> Self {
        Self::new().instance(instance)
    }

    /// Scope to the rows matched by `query`.
    #[must_use]
    pub fn matching(query: Query) -> Self {
        Self {
            query: Some(query),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    #[must_use]
    pub fn instance(mut self, instance: R) -> Self {
        self.instances.push(instance);
        self
    }

    #[must_use]
    pub fn instances(mut self, instances: impl IntoIterator<Item = R>) -> Self {
        self.instances.extend(instances);
        self
    }

    #[must_use]
    pub fn query(mut self, query: Query) -> Self {
        self.query = Some(query);
        self
    }

    /// Add an explicit SET value (updates only).
    #[must_use]
    pub fn set(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.set(name, value);
        self
    }

    #[must_use]
    pub fn values(mut self, values: StorageValues) -> Self {
        self.values = values;
        self
    }

    pub(crate) fn has_scope(&self) -> bool {
        !self.instances.is_empty() || self.query.is_some()
    }
}
