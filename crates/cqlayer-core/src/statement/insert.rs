use crate::{
    catalog::SchemaCatalog,
    error::InternalError,
    naming::Naming,
    statement::{Statement, StorageValues},
};

/// Build `INSERT INTO <resource> (<cols>) VALUES (<?...>) IF NOT EXISTS`.
///
/// Null values and values whose normalized name is not a column of
/// `resource` are skipped; a bound null would write a tombstone. At least
/// one real column is required.
pub fn build_insert(
    resource: &str,
    values: &StorageValues,
    catalog: &dyn SchemaCatalog,
    naming: &dyn Naming,
) -> Result<Statement, InternalError> {
    let mut columns = Vec::with_capacity(values.len());
    let mut bound = Vec::with_capacity(values.len());

    for entry in values {
        if entry.value.is_null() {
            continue;
        }
        let column = naming.normalize(&entry.name);
        if catalog.column_exists(resource, &column)? {
            columns.push(column);
            bound.push(entry.value.clone());
        }
    }

    if columns.is_empty() {
        return Err(InternalError::statement_config(format!(
            "insert into '{resource}' has no values for known columns"
        )));
    }

    let placeholders = vec!["?"; columns.len()].join(", ");
    let mut statement = Statement::new(format!(
        "INSERT INTO {resource} ({}) VALUES ({placeholders}) IF NOT EXISTS;",
        columns.join(", ")
    ));
    for value in bound {
        statement.push(value);
    }

    Ok(statement)
}
