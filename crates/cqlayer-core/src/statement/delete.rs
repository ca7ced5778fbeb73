use crate::{
    error::InternalError,
    statement::{Statement, key_predicate},
    value::Value,
};

///
/// DeleteTemplate
/// `DELETE FROM <resource> WHERE k = ? AND ...`, bound per row.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DeleteTemplate {
    cql: String,
    key_columns: Vec<String>,
}

impl DeleteTemplate {
    pub fn new(resource: &str, key_columns: Vec<String>) -> Result<Self, InternalError> {
        if key_columns.is_empty() {
            return Err(InternalError::statement_config(format!(
                "delete from '{resource}' has no key columns"
            )));
        }

        Ok(Self {
            cql: format!(
                "DELETE FROM {resource} WHERE {};",
                key_predicate(&key_columns)
            ),
            key_columns,
        })
    }

    #[must_use]
    pub fn cql(&self) -> &str {
        &self.cql
    }

    #[must_use]
    pub fn key_columns(&self) -> &[String] {
        &self.key_columns
    }

    pub fn bind(&self, key_values: Vec<Value>) -> Result<Statement, InternalError> {
        if key_values.len() != self.key_columns.len() {
            return Err(InternalError::statement_config(format!(
                "delete expects {} key values, got {}",
                self.key_columns.len(),
                key_values.len()
            )));
        }

        let mut statement = Statement::new(self.cql.clone());
        for value in key_values {
            statement.push(value);
        }

        Ok(statement)
    }
}
