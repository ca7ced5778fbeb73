use crate::{
    error::InternalError,
    statement::{Statement, key_predicate},
    value::Value,
};

///
/// UpdateTemplate
///
/// `UPDATE <resource> SET a = ?, ... WHERE k = ? AND ...`, built once and
/// bound per row. SET values bind first, then key values.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UpdateTemplate {
    cql: String,
    set_columns: Vec<String>,
    key_columns: Vec<String>,
}

impl UpdateTemplate {
    pub fn new(
        resource: &str,
        set_columns: Vec<String>,
        key_columns: Vec<String>,
    ) -> Result<Self, InternalError> {
        if set_columns.is_empty() {
            return Err(InternalError::statement_config(format!(
                "update of '{resource}' has no columns to set"
            )));
        }
        if key_columns.is_empty() {
            return Err(InternalError::statement_config(format!(
                "update of '{resource}' has no key columns"
            )));
        }

        let assignments = set_columns
            .iter()
            .map(|column| format!("{column} = ?"))
            .collect::<Vec<_>>()
            .join(", ");
        let cql = format!(
            "UPDATE {resource} SET {assignments} WHERE {};",
            key_predicate(&key_columns)
        );

        Ok(Self {
            cql,
            set_columns,
            key_columns,
        })
    }

    #[must_use]
    pub fn cql(&self) -> &str {
        &self.cql
    }

    #[must_use]
    pub fn set_columns(&self) -> &[String] {
        &self.set_columns
    }

    #[must_use]
    pub fn key_columns(&self) -> &[String] {
        &self.key_columns
    }

    /// Bind one row. Value counts must match the template's columns.
    pub fn bind(
        &self,
        set_values: Vec<Value>,
        key_values: Vec<Value>,
    ) -> Result<Statement, InternalError> {
        if set_values.len() != self.set_columns.len() || key_values.len() != self.key_columns.len()
        {
            return Err(InternalError::statement_config(format!(
                "update expects {} set and {} key values, got {} and {}",
                self.set_columns.len(),
                self.key_columns.len(),
                set_values.len(),
                key_values.len()
            )));
        }

        let mut statement = Statement::new(self.cql.clone());
        for value in set_values.into_iter().chain(key_values) {
            statement.push(value);
        }

        Ok(statement)
    }
}
