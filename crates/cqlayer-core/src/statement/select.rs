use crate::{
    error::InternalError,
    naming::Naming,
    plan::{KeyMetadata, PushdownPlan, plan},
    query::{Query, ReturnField},
    statement::Statement,
    value::Value,
};
use std::fmt::Write as _;

///
/// Projection
///
/// Where the requested return fields are applied. `Deferred` means the
/// native statement selects every column and the projection runs after the
/// residual filter.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Projection {
    All,
    Native(Vec<ReturnField>),
    Deferred(Vec<ReturnField>),
}

///
/// SelectStatement
///

#[derive(Clone, Debug)]
pub struct SelectStatement {
    pub statement: Statement,
    pub plan: PushdownPlan,
    pub projection: Projection,
}

/// Build `SELECT <fields|*> FROM <resource> [WHERE ...] [LIMIT n]`.
pub fn build_select(
    query: &Query,
    keys: &KeyMetadata,
    naming: &dyn Naming,
    params: &[Value],
) -> Result<SelectStatement, InternalError> {
    let resource = naming.normalize(query.resource());
    let plan = plan(query, keys, naming, params)?;

    let projection = if query.fields().is_empty() {
        Projection::All
    } else if plan.has_residual() {
        Projection::Deferred(query.fields().to_vec())
    } else {
        Projection::Native(query.fields().to_vec())
    };

    let columns = match &projection {
        Projection::Native(fields) => fields
            .iter()
            .map(|field| select_item(field, naming))
            .collect::<Vec<_>>()
            .join(", "),
        Projection::All | Projection::Deferred(_) => "*".to_string(),
    };

    let mut cql = format!("SELECT {columns} FROM {resource}");
    if let Some(clause) = plan.where_clause() {
        cql.push_str(" WHERE ");
        cql.push_str(&clause);
    }
    if let Some(limit) = plan.native_limit() {
        let _ = write!(cql, " LIMIT {limit}");
    }
    cql.push(';');

    let mut statement = Statement::new(cql);
    for value in plan.values() {
        statement.push(value.clone());
    }

    Ok(SelectStatement {
        statement,
        plan,
        projection,
    })
}

fn select_item(field: &ReturnField, naming: &dyn Naming) -> String {
    let column = naming.normalize(&field.name);

    match &field.alias {
        Some(alias) => format!("{column} AS {}", naming.normalize(alias)),
        None => column,
    }
}
