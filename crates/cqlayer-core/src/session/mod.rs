//! Storage session: the per-unit-of-work entry point.
//!
//! A session holds shared handles only (transport, catalog, naming and the
//! model caches) and turns each operation into native statements. Batches
//! issued by update and delete are best-effort: a failing row is logged and
//! skipped, the rest of the batch still runs.

mod mutation;


use crate::{
    catalog::SchemaCatalog,
    error::InternalError,
    materialize::{
        MapSource, Materializer, PostEvaluation, RecordSource, RowSource, check_residual_fields,
    },
    model::{ColumnTable, ModelRegistry, Record, TypeRegistry},
    naming::Naming,
    plan::{KeyMetadata, client_window},
    query::{Query, matches},
    response::{ResultSet, RowMap},
    statement::{
        DeleteTemplate, Projection, SelectStatement, Statement, StorageValues, UpdateTemplate,
        build_insert, build_select,
    },
    transport::{Row, Transport},
    value::Value,
};
use std::{sync::Arc, time::Instant};
use tracing::{debug, warn};

// re-exports
pub use mutation::Mutation;

///
/// StorageSession
///

#[derive(Clone)]
pub struct StorageSession {
    transport: Arc<dyn Transport>,
    catalog: Arc<dyn SchemaCatalog>,
    naming: Arc<dyn Naming>,
    models: Arc<ModelRegistry>,
    types: Arc<TypeRegistry>,
    post_evaluation: PostEvaluation,
}

impl StorageSession {
    #[must_use]
    pub fn new(
        transport: Arc<dyn Transport>,
        catalog: Arc<dyn SchemaCatalog>,
        naming: Arc<dyn Naming>,
        models: Arc<ModelRegistry>,
        types: Arc<TypeRegistry>,
    ) -> Self {
        Self {
            transport,
            catalog,
            naming,
            models,
            types,
            post_evaluation: PostEvaluation::default(),
        }
    }

    #[must_use]
    pub fn with_post_evaluation(mut self, post_evaluation: PostEvaluation) -> Self {
        self.post_evaluation = post_evaluation;
        self
    }

    #[must_use]
    pub const fn post_evaluation(&self) -> PostEvaluation {
        self.post_evaluation
    }

    #[must_use]
    pub fn naming(&self) -> &dyn Naming {
        self.naming.as_ref()
    }

    fn materializer(&self) -> Materializer<'_> {
        Materializer::new(self.naming.as_ref(), &self.types)
    }

    // ---------------------------------------------------------------------
    // Insert
    // ---------------------------------------------------------------------

    /// Insert one record. Fields without a column and null fields are not
    /// written; the record itself is returned as `Single`.
    pub fn insert<R: Record>(&self, record: R) -> Result<ResultSet<R>, InternalError> {
        let table = self.models.table::<R>(self.naming.as_ref());
        let values: StorageValues = table
            .model()
            .fields
            .iter()
            .map(|field| (field.name, (field.get)(&record)))
            .collect();

        let statement = build_insert(
            table.resource(),
            &values,
            self.catalog.as_ref(),
            self.naming.as_ref(),
        )?;
        self.execute(&statement)?;

        Ok(ResultSet::Single(record))
    }

    /// Insert raw storage values into `resource`; the store's rows come
    /// back unchanged as `MapRows`, or `Empty` when it returns none.
    pub fn insert_values(
        &self,
        resource: &str,
        values: &StorageValues,
    ) -> Result<ResultSet, InternalError> {
        let resource = self.resource_name(Some(resource))?;
        let statement = build_insert(
            &resource,
            values,
            self.catalog.as_ref(),
            self.naming.as_ref(),
        )?;
        let rows = self.execute(&statement)?;
        if rows.is_empty() {
            return Ok(ResultSet::Empty);
        }
        let materializer = self.materializer();

        Ok(ResultSet::map_rows(
            rows.into_iter().map(|row| materializer.row_map(row)).collect(),
        ))
    }

    // ---------------------------------------------------------------------
    // Select
    // ---------------------------------------------------------------------

    /// Run a query and materialize matching rows as `R`.
    pub fn select<R: Record>(
        &self,
        query: &Query,
        params: &[Value],
    ) -> Result<ResultSet<R>, InternalError> {
        let started = Instant::now();
        let table = self.models.table::<R>(self.naming.as_ref());
        let (select, rows) = self.run_select(query, params)?;
        let parse_started = Instant::now();

        let residual = select.plan.residual().predicate();
        let naming = self.naming.as_ref();
        let materializer = self.materializer();

        let records: Vec<R> = match self.post_evaluation {
            PostEvaluation::RawRows => {
                let mut kept = Vec::with_capacity(rows.len());
                for row in rows {
                    if matches(&RowSource { row: &row, naming }, residual)? {
                        kept.push(row);
                    }
                }

                client_window(kept, query.start_value(), query.limit_value())
                    .iter()
                    .map(|row| materializer.record_from_row(&table, row))
                    .collect()
            }
            PostEvaluation::Materialized => {
                check_residual_fields(&table, residual, naming)?;

                let mut kept = Vec::with_capacity(rows.len());
                for row in &rows {
                    let record: R = materializer.record_from_row(&table, row);
                    let source = RecordSource {
                        record: &record,
                        table: &table,
                        naming,
                    };
                    if matches(&source, residual)? {
                        kept.push(record);
                    }
                }

                client_window(kept, query.start_value(), query.limit_value())
            }
        };

        debug!(
            resource = table.resource(),
            records = records.len(),
            parse = ?parse_started.elapsed(),
            total = ?started.elapsed(),
            "select materialized"
        );

        Ok(ResultSet::shaped(records))
    }

    /// Run a query and return matching rows as row maps.
    pub fn select_rows(&self, query: &Query, params: &[Value]) -> Result<ResultSet, InternalError> {
        Ok(ResultSet::map_rows(self.fetch_maps(query, params)?))
    }

    fn run_select(
        &self,
        query: &Query,
        params: &[Value],
    ) -> Result<(SelectStatement, Vec<Row>), InternalError> {
        let resource = self.resource_name(Some(query.resource()))?;
        let keys = KeyMetadata::resolve(self.catalog.as_ref(), &resource)?;
        let select = build_select(query, &keys, self.naming.as_ref(), params)?;
        let rows = self.execute(&select.statement)?;

        Ok((select, rows))
    }

    fn fetch_maps(&self, query: &Query, params: &[Value]) -> Result<Vec<RowMap>, InternalError> {
        let (select, rows) = self.run_select(query, params)?;
        let residual = select.plan.residual().predicate();
        let naming = self.naming.as_ref();
        let materializer = self.materializer();

        let mut kept = Vec::with_capacity(rows.len());
        for row in rows {
            match self.post_evaluation {
                PostEvaluation::RawRows => {
                    if matches(&RowSource { row: &row, naming }, residual)? {
                        kept.push(materializer.row_map(row));
                    }
                }
                PostEvaluation::Materialized => {
                    let map = materializer.row_map(row);
                    if matches(&MapSource { map: &map, naming }, residual)? {
                        kept.push(map);
                    }
                }
            }
        }
        let kept = client_window(kept, query.start_value(), query.limit_value());

        Ok(match &select.projection {
            Projection::Deferred(fields) => kept
                .iter()
                .map(|map| materializer.project(map, fields))
                .collect(),
            Projection::All | Projection::Native(_) => kept,
        })
    }

    // ---------------------------------------------------------------------
    // Update / Delete
    // ---------------------------------------------------------------------

    /// Update records. Instance mode keys each statement by the instance's
    /// row key; query mode updates every matching row and needs explicit
    /// values. Results come back as `Collection`.
    pub fn update<R: Record>(
        &self,
        mutation: Mutation<R>,
        params: &[Value],
    ) -> Result<ResultSet<R>, InternalError> {
        require_scope(&mutation)?;
        let subject = self.typed::<R>();

        self.run_update(&subject, mutation, params)
    }

    /// Untyped update over row maps; results come back as `MapRows`.
    pub fn update_rows(
        &self,
        mutation: Mutation,
        params: &[Value],
    ) -> Result<ResultSet, InternalError> {
        require_scope(&mutation)?;
        let subject = self.untyped(&mutation)?;

        self.run_update(&subject, mutation, params)
    }

    pub fn delete<R: Record>(
        &self,
        mutation: Mutation<R>,
        params: &[Value],
    ) -> Result<ResultSet<R>, InternalError> {
        require_scope(&mutation)?;
        let subject = self.typed::<R>();

        self.run_delete(&subject, mutation, params)
    }

    pub fn delete_rows(
        &self,
        mutation: Mutation,
        params: &[Value],
    ) -> Result<ResultSet, InternalError> {
        require_scope(&mutation)?;
        let subject = self.untyped(&mutation)?;

        self.run_delete(&subject, mutation, params)
    }

    fn run_update<S: Subject>(
        &self,
        subject: &S,
        mutation: Mutation<S::Item>,
        params: &[Value],
    ) -> Result<ResultSet<S::Item>, InternalError> {
        let resource = subject.resource();
        let keys = self.catalog.row_keys(resource)?;
        let explicit = self.assignments(resource, &keys, &mutation.values)?;
        let shared = if mutation.values.is_empty() {
            None
        } else {
            Some(UpdateTemplate::new(resource, columns_of(&explicit), keys.clone())?)
        };
        if let Some(template) = &shared {
            self.prepare(template.cql())?;
        }

        let mut updated = Vec::new();
        if mutation.instances.is_empty() {
            let (Some(query), Some(template)) = (&mutation.query, &shared) else {
                return Err(InternalError::session_config(format!(
                    "update of '{resource}' by query needs explicit values"
                )));
            };

            for mut row in self.fetch_maps(query, params)? {
                let applied = row_key_values(&row, &keys)
                    .and_then(|key_values| template.bind(values_of(&explicit), key_values))
                    .and_then(|statement| self.execute(&statement));
                match applied {
                    Ok(_) => {
                        for (column, value) in &explicit {
                            row.insert(column.clone(), value.clone());
                        }
                        updated.push(subject.from_row(&row));
                    }
                    Err(err) => warn!(resource, ?row, error = %err, "skipping row that could not be updated"),
                }
            }
        } else {
            for mut item in mutation.instances {
                match self.update_instance(subject, &mut item, &keys, shared.as_ref(), &explicit) {
                    Ok(()) => updated.push(item),
                    Err(err) => warn!(resource, error = %err, "skipping instance that could not be updated"),
                }
            }
        }

        Ok(subject.finish(updated))
    }

    fn update_instance<S: Subject>(
        &self,
        subject: &S,
        item: &mut S::Item,
        keys: &[String],
        shared: Option<&UpdateTemplate>,
        explicit: &[(String, Value)],
    ) -> Result<(), InternalError> {
        let key_values = instance_key_values(subject, item, keys)?;

        let statement = if let Some(template) = shared {
            template.bind(values_of(explicit), key_values)?
        } else {
            let derived = self.derived_assignments(subject, item, keys)?;
            UpdateTemplate::new(subject.resource(), columns_of(&derived), keys.to_vec())?
                .bind(values_of(&derived), key_values)?
        };
        self.execute(&statement)?;

        if shared.is_some() {
            subject.apply(item, explicit);
        }

        Ok(())
    }

    fn run_delete<S: Subject>(
        &self,
        subject: &S,
        mutation: Mutation<S::Item>,
        params: &[Value],
    ) -> Result<ResultSet<S::Item>, InternalError> {
        let resource = subject.resource();
        let keys = self.catalog.row_keys(resource)?;
        let template = DeleteTemplate::new(resource, keys.clone())?;
        self.prepare(template.cql())?;

        let mut deleted = Vec::new();
        if mutation.instances.is_empty() {
            let Some(query) = &mutation.query else {
                return Ok(subject.finish(deleted));
            };

            for row in self.fetch_maps(query, params)? {
                let applied = row_key_values(&row, &keys)
                    .and_then(|key_values| template.bind(key_values))
                    .and_then(|statement| self.execute(&statement));
                match applied {
                    Ok(_) => deleted.push(subject.from_row(&row)),
                    Err(err) => warn!(resource, ?row, error = %err, "skipping row that could not be deleted"),
                }
            }
        } else {
            for item in mutation.instances {
                let applied = instance_key_values(subject, &item, &keys)
                    .and_then(|key_values| template.bind(key_values))
                    .and_then(|statement| self.execute(&statement));
                match applied {
                    Ok(_) => deleted.push(item),
                    Err(err) => warn!(resource, error = %err, "skipping instance that could not be deleted"),
                }
            }
        }

        Ok(subject.finish(deleted))
    }

    // Explicit SET values restricted to real, non-key columns.
    fn assignments(
        &self,
        resource: &str,
        keys: &[String],
        values: &StorageValues,
    ) -> Result<Vec<(String, Value)>, InternalError> {
        let mut assignments = Vec::with_capacity(values.len());
        for entry in values {
            let column = self.naming.normalize(&entry.name);
            if keys.contains(&column) || !self.catalog.column_exists(resource, &column)? {
                continue;
            }
            assignments.push((column, entry.value.clone()));
        }

        Ok(assignments)
    }

    // SET values taken from the instance itself: non-null, non-key columns.
    fn derived_assignments<S: Subject>(
        &self,
        subject: &S,
        item: &S::Item,
        keys: &[String],
    ) -> Result<Vec<(String, Value)>, InternalError> {
        let mut assignments = Vec::new();
        for (column, value) in subject.column_values(item) {
            if value.is_null() || keys.contains(&column) {
                continue;
            }
            if self.catalog.column_exists(subject.resource(), &column)? {
                assignments.push((column, value));
            }
        }

        Ok(assignments)
    }

    // ---------------------------------------------------------------------
    // Helpers
    // ---------------------------------------------------------------------

    fn execute(&self, statement: &Statement) -> Result<Vec<Row>, InternalError> {
        let started = Instant::now();
        let rows = self.transport.execute(statement)?;

        debug!(
            cql = %statement.render(),
            rows = rows.len(),
            elapsed = ?started.elapsed(),
            "statement executed"
        );

        Ok(rows)
    }

    // Shared batch statements are prepared once, before the first row.
    fn prepare(&self, cql: &str) -> Result<(), InternalError> {
        let handle = self.transport.prepare(cql)?;
        debug!(cql = %handle.cql, "statement prepared");

        Ok(())
    }

    fn resource_name(&self, resource: Option<&str>) -> Result<String, InternalError> {
        resource
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(|name| self.naming.normalize(name))
            .ok_or_else(|| InternalError::session_config("resource name missing"))
    }

    fn typed<R: Record>(&self) -> Typed<'_, R> {
        Typed {
            table: self.models.table::<R>(self.naming.as_ref()),
            materializer: self.materializer(),
        }
    }

    fn untyped(&self, mutation: &Mutation) -> Result<Untyped<'_>, InternalError> {
        let resource = mutation
            .resource
            .as_deref()
            .or_else(|| mutation.query.as_ref().map(Query::resource));

        Ok(Untyped {
            resource: self.resource_name(resource)?,
            naming: self.naming.as_ref(),
        })
    }
}

fn require_scope<R>(mutation: &Mutation<R>) -> Result<(), InternalError> {
    if mutation.has_scope() {
        Ok(())
    } else {
        Err(InternalError::session_config(
            "mutation needs instances or a query",
        ))
    }
}

fn columns_of(assignments: &[(String, Value)]) -> Vec<String> {
    assignments.iter().map(|(column, _)| column.clone()).collect()
}

fn values_of(assignments: &[(String, Value)]) -> Vec<Value> {
    assignments.iter().map(|(_, value)| value.clone()).collect()
}

fn instance_key_values<S: Subject>(
    subject: &S,
    item: &S::Item,
    keys: &[String],
) -> Result<Vec<Value>, InternalError> {
    keys.iter()
        .map(|key| {
            subject
                .key_value(item, key)
                .ok_or_else(|| missing_key(subject.resource(), key))
        })
        .collect()
}

fn row_key_values(row: &RowMap, keys: &[String]) -> Result<Vec<Value>, InternalError> {
    keys.iter()
        .map(|key| {
            row.get(key)
                .filter(|value| !value.is_null())
                .cloned()
                .ok_or_else(|| missing_key("row", key))
        })
        .collect()
}

fn missing_key(resource: &str, key: &str) -> InternalError {
    InternalError::mapping(format!("{resource}: no value for key column '{key}'"))
}

///
/// Subject
///
/// Typed/untyped view of the items an update or delete batch works on.
///

trait Subject {
    type Item;

    /// Normalized resource name.
    fn resource(&self) -> &str;

    fn key_value(&self, item: &Self::Item, column: &str) -> Option<Value>;

    /// Every `(column, value)` pair of the item, columns normalized.
    fn column_values(&self, item: &Self::Item) -> Vec<(String, Value)>;

    fn from_row(&self, row: &RowMap) -> Self::Item;

    fn apply(&self, item: &mut Self::Item, assignments: &[(String, Value)]);

    fn finish(&self, items: Vec<Self::Item>) -> ResultSet<Self::Item>;
}

struct Typed<'a, R: Record> {
    table: Arc<ColumnTable<R>>,
    materializer: Materializer<'a>,
}

impl<R: Record> Subject for Typed<'_, R> {
    type Item = R;

    fn resource(&self) -> &str {
        self.table.resource()
    }

    fn key_value(&self, item: &R, column: &str) -> Option<Value> {
        self.table
            .field(column)
            .map(|field| (field.get)(item))
            .filter(|value| !value.is_null())
    }

    fn column_values(&self, item: &R) -> Vec<(String, Value)> {
        self.table
            .columns()
            .map(|(column, field)| (column.to_string(), (field.get)(item)))
            .collect()
    }

    fn from_row(&self, row: &RowMap) -> R {
        self.materializer.record_from_map(&self.table, row)
    }

    fn apply(&self, item: &mut R, assignments: &[(String, Value)]) {
        self.materializer.assign(
            &self.table,
            item,
            assignments.iter().map(|(column, value)| (column.as_str(), value)),
        );
    }

    fn finish(&self, items: Vec<R>) -> ResultSet<R> {
        ResultSet::Collection(items)
    }
}

struct Untyped<'a> {
    resource: String,
    naming: &'a dyn Naming,
}

impl Subject for Untyped<'_> {
    type Item = RowMap;

    fn resource(&self) -> &str {
        &self.resource
    }

    fn key_value(&self, item: &RowMap, column: &str) -> Option<Value> {
        item.iter()
            .find(|(name, _)| self.naming.normalize(name) == column)
            .map(|(_, value)| value.clone())
            .filter(|value| !value.is_null())
    }

    fn column_values(&self, item: &RowMap) -> Vec<(String, Value)> {
        item.iter()
            .map(|(name, value)| (self.naming.normalize(name), value.clone()))
            .collect()
    }

    fn from_row(&self, row: &RowMap) -> RowMap {
        row.clone()
    }

    fn apply(&self, item: &mut RowMap, assignments: &[(String, Value)]) {
        for (column, value) in assignments {
            let existing = item
                .iter()
                .find(|(name, _)| self.naming.normalize(name) == *column)
                .map(|(name, _)| name.to_string());

            item.insert(existing.unwrap_or_else(|| column.clone()), value.clone());
        }
    }

    fn finish(&self, items: Vec<RowMap>) -> ResultSet {
        ResultSet::MapRows(items)
    }
}
