//! The record store: insertion-ordered in-memory tables with store-assigned
//! surrogate keys.
//!
//! Mutations apply directly to the stored rows with no staging layer; a scan
//! issued after a mutation observes it immediately. Single-writer semantics
//! are enforced by `&mut self` on every mutating method, so an embedding host
//! only has to serialize access to the store value itself.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::table::ColumnDef;
use crate::value::Value;

/// The result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// An enum representing possible errors that can occur in the record store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The table was never registered.
    #[error("table not found: {0}")]
    TableNotFound(&'static str),

    /// The record identified by the given key does not exist.
    #[error("record not found: {0}")]
    RecordNotFound(RecordId),

    /// An inserted value names a column the table schema does not declare.
    #[error("unknown column '{column}' for table '{table}'")]
    UnknownColumn {
        table: &'static str,
        column: &'static str,
    },
}

/// A surrogate key assigned by the store, unique within a table and immutable
/// once assigned.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct RecordId(pub u64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<RecordId> for Value {
    fn from(id: RecordId) -> Self {
        Value::Uint64(id.0)
    }
}

/// A row held by the store: the surrogate key plus one value per schema
/// column, in schema column order.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRow {
    pub id: RecordId,
    pub values: Vec<Value>,
}

/// One registered table.
#[derive(Debug, Default)]
struct Table {
    columns: &'static [ColumnDef],
    next_id: u64,
    rows: Vec<StoredRow>,
}

/// Holds the ordered record collections for every registered table.
#[derive(Debug, Default)]
pub struct RecordStore {
    tables: HashMap<&'static str, Table>,
}

impl RecordStore {
    /// Registers a table. Registering the same name twice is a no-op.
    pub fn register(&mut self, table: &'static str, columns: &'static [ColumnDef]) {
        self.tables.entry(table).or_insert(Table {
            columns,
            next_id: 1,
            rows: Vec::new(),
        });
    }

    /// Returns the column definitions of a registered table.
    pub fn columns(&self, table: &'static str) -> StoreResult<&'static [ColumnDef]> {
        self.table(table).map(|t| t.columns)
    }

    /// Inserts a row built from the provided column values and returns the
    /// surrogate key assigned to it.
    ///
    /// The primary key column is filled in by the store; any other column
    /// missing from `values` is stored as NULL.
    pub fn insert_row(
        &mut self,
        table: &'static str,
        values: Vec<(ColumnDef, Value)>,
    ) -> StoreResult<RecordId> {
        let t = self.table_mut(table)?;
        for (col_def, _) in &values {
            if !t.columns.iter().any(|col| col.name == col_def.name) {
                return Err(StoreError::UnknownColumn {
                    table,
                    column: col_def.name,
                });
            }
        }

        let id = RecordId(t.next_id);
        t.next_id += 1;

        let row_values = t
            .columns
            .iter()
            .map(|col| {
                if col.primary_key {
                    Value::from(id)
                } else {
                    values
                        .iter()
                        .find(|(col_def, _)| col_def.name == col.name)
                        .map(|(_, value)| value.clone())
                        .unwrap_or(Value::Null)
                }
            })
            .collect();

        t.rows.push(StoredRow {
            id,
            values: row_values,
        });
        Ok(id)
    }

    /// Looks up a row by its surrogate key.
    pub fn get(&self, table: &'static str, id: RecordId) -> StoreResult<&StoredRow> {
        self.table(table)?
            .rows
            .iter()
            .find(|row| row.id == id)
            .ok_or(StoreError::RecordNotFound(id))
    }

    /// Returns all rows of a table in insertion order.
    pub fn scan(&self, table: &'static str) -> StoreResult<&[StoredRow]> {
        self.table(table).map(|t| t.rows.as_slice())
    }

    /// Applies a mutation to the values of a single row.
    pub fn update_row<F>(&mut self, table: &'static str, id: RecordId, mutation: F) -> StoreResult<()>
    where
        F: FnOnce(&mut Vec<Value>),
    {
        let row = self
            .table_mut(table)?
            .rows
            .iter_mut()
            .find(|row| row.id == id)
            .ok_or(StoreError::RecordNotFound(id))?;
        mutation(&mut row.values);
        Ok(())
    }

    /// Deletes a row by its surrogate key.
    pub fn delete(&mut self, table: &'static str, id: RecordId) -> StoreResult<()> {
        let t = self.table_mut(table)?;
        let position = t
            .rows
            .iter()
            .position(|row| row.id == id)
            .ok_or(StoreError::RecordNotFound(id))?;
        t.rows.remove(position);
        Ok(())
    }

    /// Deletes every row matching the predicate and returns the count.
    pub fn delete_where<F>(&mut self, table: &'static str, mut predicate: F) -> StoreResult<u64>
    where
        F: FnMut(&StoredRow) -> bool,
    {
        let t = self.table_mut(table)?;
        let before = t.rows.len();
        t.rows.retain(|row| !predicate(row));
        Ok((before - t.rows.len()) as u64)
    }

    fn table(&self, table: &'static str) -> StoreResult<&Table> {
        self.tables.get(table).ok_or(StoreError::TableNotFound(table))
    }

    fn table_mut(&mut self, table: &'static str) -> StoreResult<&mut Table> {
        self.tables
            .get_mut(table)
            .ok_or(StoreError::TableNotFound(table))
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::table::TableSchema;
    use crate::tests::Team;

    fn team_store() -> RecordStore {
        let mut store = RecordStore::default();
        store.register(Team::table_name(), Team::columns());
        store
    }

    fn name_value(name: &str) -> Vec<(ColumnDef, Value)> {
        vec![(Team::columns()[1], Value::from(name))]
    }

    #[test]
    fn test_should_insert_and_assign_sequential_ids() {
        let mut store = team_store();
        let a = store
            .insert_row(Team::table_name(), name_value("teamA"))
            .expect("failed to insert");
        let b = store
            .insert_row(Team::table_name(), name_value("teamB"))
            .expect("failed to insert");

        assert_eq!(a, RecordId(1));
        assert_eq!(b, RecordId(2));

        let row = store.get(Team::table_name(), a).expect("failed to get");
        assert_eq!(row.values[0], Value::Uint64(1));
        assert_eq!(row.values[1], Value::from("teamA"));
    }

    #[test]
    fn test_should_scan_in_insertion_order() {
        let mut store = team_store();
        for name in ["teamC", "teamA", "teamB"] {
            store
                .insert_row(Team::table_name(), name_value(name))
                .expect("failed to insert");
        }

        let names: Vec<_> = store
            .scan(Team::table_name())
            .expect("failed to scan")
            .iter()
            .map(|row| row.values[1].clone())
            .collect();
        assert_eq!(
            names,
            vec![
                Value::from("teamC"),
                Value::from("teamA"),
                Value::from("teamB")
            ]
        );
    }

    #[test]
    fn test_should_fail_get_of_unknown_record() {
        let store = team_store();
        let result = store.get(Team::table_name(), RecordId(99));
        assert!(matches!(result, Err(StoreError::RecordNotFound(_))));
    }

    #[test]
    fn test_should_fail_on_unregistered_table() {
        let store = RecordStore::default();
        let result = store.scan("nope_this_name_is_static");
        assert!(matches!(result, Err(StoreError::TableNotFound(_))));
    }

    #[test]
    fn test_should_reject_unknown_column_on_insert() {
        let mut store = team_store();
        let bogus = ColumnDef {
            name: "motto",
            data_type: crate::types::DataTypeKind::Text,
            nullable: true,
            primary_key: false,
            foreign_key: None,
        };
        let result = store.insert_row(Team::table_name(), vec![(bogus, Value::from("go"))]);
        assert!(matches!(
            result,
            Err(StoreError::UnknownColumn {
                column: "motto",
                ..
            })
        ));
    }

    #[test]
    fn test_should_update_row_in_place() {
        let mut store = team_store();
        let id = store
            .insert_row(Team::table_name(), name_value("teamA"))
            .expect("failed to insert");

        store
            .update_row(Team::table_name(), id, |values| {
                values[1] = Value::from("teamZ");
            })
            .expect("failed to update");

        // a later read observes the change immediately
        let row = store.get(Team::table_name(), id).expect("failed to get");
        assert_eq!(row.values[1], Value::from("teamZ"));
    }

    #[test]
    fn test_should_delete_where() {
        let mut store = team_store();
        for name in ["teamA", "teamB", "teamC"] {
            store
                .insert_row(Team::table_name(), name_value(name))
                .expect("failed to insert");
        }

        let deleted = store
            .delete_where(Team::table_name(), |row| {
                row.values[1] != Value::from("teamB")
            })
            .expect("failed to delete");
        assert_eq!(deleted, 2);

        let remaining = store.scan(Team::table_name()).expect("failed to scan");
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].values[1], Value::from("teamB"));
    }
}
