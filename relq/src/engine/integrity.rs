//! Referential integrity checks applied before a record enters the store.

use std::marker::PhantomData;

use crate::query::QueryError;
use crate::store::RecordStore;
use crate::table::{ColumnDef, TableSchema};
use crate::value::Value;
use crate::RelqResult;

/// Validates the integrity of a record before insertion.
///
/// Two rules are enforced: every non-nullable column must carry a non-NULL
/// value, and every non-NULL foreign key must reference an existing record
/// in its foreign table.
pub struct InsertIntegrityValidator<'a, T>
where
    T: TableSchema,
{
    store: &'a RecordStore,
    _marker: PhantomData<T>,
}

impl<'a, T> InsertIntegrityValidator<'a, T>
where
    T: TableSchema,
{
    pub fn new(store: &'a RecordStore) -> Self {
        Self {
            store,
            _marker: PhantomData,
        }
    }

    /// Validates the values to be inserted.
    pub fn validate(&self, values: &[(ColumnDef, Value)]) -> RelqResult<()> {
        self.validate_non_nullable(values)?;
        self.validate_foreign_keys(values)
    }

    /// Checks that every non-nullable column carries a value.
    ///
    /// The surrogate key column is exempt; the store fills it in.
    fn validate_non_nullable(&self, values: &[(ColumnDef, Value)]) -> RelqResult<()> {
        for column in T::columns() {
            if column.nullable || column.primary_key {
                continue;
            }
            let provided = values
                .iter()
                .find(|(col, _)| col.name == column.name)
                .map(|(_, value)| value);
            if provided.is_none_or(Value::is_null) {
                return Err(QueryError::MissingNonNullableField(column.name).into());
            }
        }
        Ok(())
    }

    /// Checks that every non-NULL foreign key references an existing record.
    fn validate_foreign_keys(&self, values: &[(ColumnDef, Value)]) -> RelqResult<()> {
        for (column, value) in values {
            let Some(fk) = column.foreign_key else {
                continue;
            };
            if value.is_null() {
                continue;
            }

            let foreign_columns = self.store.columns(fk.foreign_table)?;
            let index = foreign_columns
                .iter()
                .position(|col| col.name == fk.foreign_column)
                .ok_or_else(|| QueryError::UnknownColumn(fk.foreign_column.to_string()))?;

            let exists = self
                .store
                .scan(fk.foreign_table)?
                .iter()
                .any(|row| row.values[index] == *value);
            if !exists {
                return Err(QueryError::BrokenForeignKeyReference {
                    table: fk.foreign_table,
                    key: value.clone(),
                }
                .into());
            }
        }
        Ok(())
    }
}
