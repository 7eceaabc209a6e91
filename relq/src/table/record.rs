use crate::query::{Filter, QueryError, QueryResult};
use crate::table::{ColumnDef, TableSchema};
use crate::value::Value;

/// This trait represents a record returned by a [`crate::query::Query`] for a table.
pub trait TableRecord {
    /// The table schema associated with this record.
    type Schema: TableSchema<Record = Self>;

    /// Constructs [`TableRecord`] from a list of column values.
    ///
    /// Columns missing from the list were not selected and map to `None`
    /// fields on the record.
    fn from_values(values: &[(ColumnDef, Value)]) -> Self;

    /// Converts the record into a list of column [`Value`]s, in schema
    /// column order.
    fn to_values(&self) -> Vec<Value>;
}

/// This trait represents a record for inserting into a table.
pub trait InsertRecord {
    /// The table schema associated with this record.
    type Schema: TableSchema;

    /// Converts the record into a list of column [`Value`]s for insertion.
    ///
    /// The surrogate key column must not be part of the list; the store
    /// assigns it.
    fn into_values(self) -> Vec<(ColumnDef, Value)>;
}

/// This trait represents a bulk update patch for a table.
///
/// The patch is applied directly against the store to every record matching
/// [`UpdateRecord::where_clause`]; any result set fetched earlier is a
/// snapshot and keeps its pre-update values.
pub trait UpdateRecord {
    /// The table schema associated with this record.
    type Schema: TableSchema;

    /// Get the list of column [`Assignment`]s to be applied.
    fn assignments(&self) -> Vec<(ColumnDef, Assignment)>;

    /// Get the [`Filter`] condition for the update operation.
    fn where_clause(&self) -> Option<Filter>;
}

/// A single column assignment within a bulk update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assignment {
    /// Replace the current value.
    Set(Value),
    /// Add the operand to the current numeric value. NULL stays NULL.
    Add(Value),
}

impl Assignment {
    /// Computes the new value for a column given its current value.
    pub fn apply(&self, column: &ColumnDef, current: &Value) -> QueryResult<Value> {
        match self {
            Assignment::Set(value) => Ok(value.clone()),
            Assignment::Add(_) if current.is_null() => Ok(Value::Null),
            Assignment::Add(operand) => match (current, operand) {
                (Value::Int64(a), Value::Int64(b)) => a
                    .checked_add(*b)
                    .map(Value::Int64)
                    .ok_or_else(|| QueryError::InvalidQuery(overflow(column))),
                (Value::Uint64(a), Value::Uint64(b)) => a
                    .checked_add(*b)
                    .map(Value::Uint64)
                    .ok_or_else(|| QueryError::InvalidQuery(overflow(column))),
                (Value::Decimal(a), Value::Decimal(b)) => a
                    .checked_add(*b)
                    .map(Value::Decimal)
                    .ok_or_else(|| QueryError::InvalidQuery(overflow(column))),
                (current, operand) => Err(QueryError::TypeMismatch {
                    column: column.name,
                    expected: current.type_name(),
                    found: operand.type_name(),
                }),
            },
        }
    }
}

fn overflow(column: &ColumnDef) -> String {
    format!("numeric overflow while updating column '{}'", column.name)
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::types::DataTypeKind;

    const AGE: ColumnDef = ColumnDef {
        name: "age",
        data_type: DataTypeKind::Int64,
        nullable: false,
        primary_key: false,
        foreign_key: None,
    };

    #[test]
    fn test_should_apply_set_assignment() {
        let assignment = Assignment::Set(Value::Int64(5));
        let new_value = assignment
            .apply(&AGE, &Value::Int64(10))
            .expect("failed to apply");
        assert_eq!(new_value, Value::Int64(5));
    }

    #[test]
    fn test_should_apply_add_assignment() {
        let assignment = Assignment::Add(Value::Int64(1));
        let new_value = assignment
            .apply(&AGE, &Value::Int64(10))
            .expect("failed to apply");
        assert_eq!(new_value, Value::Int64(11));
    }

    #[test]
    fn test_should_keep_null_on_add() {
        let assignment = Assignment::Add(Value::Int64(1));
        let new_value = assignment
            .apply(&AGE, &Value::Null)
            .expect("failed to apply");
        assert_eq!(new_value, Value::Null);
    }

    #[test]
    fn test_should_fail_add_on_type_mismatch() {
        let assignment = Assignment::Add(Value::Text("one".to_string()));
        let result = assignment.apply(&AGE, &Value::Int64(10));
        assert!(matches!(result, Err(QueryError::TypeMismatch { .. })));
    }
}
