//! This module exposes all the types related to queries that can be evaluated by the engine.

mod builder;
mod filter;

use std::marker::PhantomData;

use thiserror::Error;

pub use self::builder::QueryBuilder;
pub(crate) use self::filter::field_value;
pub use self::filter::Filter;
use crate::table::TableSchema;
use crate::value::Value;

/// The result type for query operations.
pub type QueryResult<T> = Result<T, QueryError>;

/// An enum representing possible errors that can occur during query operations.
#[derive(Debug, Error)]
pub enum QueryError {
    /// A foreign key references a non-existent record in another table.
    #[error("broken foreign key reference to table '{table}' with key '{key:?}'")]
    BrokenForeignKeyReference { table: &'static str, key: Value },

    /// Tried to reference a column that does not exist in the table schema.
    #[error("unknown column: {0}")]
    UnknownColumn(String),

    /// Tried to insert a record missing non-nullable fields.
    #[error("missing non-nullable field: {0}")]
    MissingNonNullableField(&'static str),

    /// Tried to compare or combine values of incompatible types (e.g. Int64 vs Text).
    #[error("type mismatch on column '{column}': expected {expected}, found {found}")]
    TypeMismatch {
        column: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    /// Query contains syntactically or semantically invalid conditions.
    #[error("invalid query: {0}")]
    InvalidQuery(String),
}

/// An enum representing the fields to select in a query.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum Select {
    #[default]
    All,
    Columns(Vec<&'static str>),
}

/// An enum representing the direction of ordering in a query.
///
/// NULL values sort after all non-NULL values for both directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDirection {
    Ascending,
    Descending,
}

/// A struct representing a query against a single table.
#[derive(Debug, Clone, PartialEq)]
pub struct Query<T>
where
    T: TableSchema,
{
    /// Fields to select in the query.
    pub(crate) columns: Select,
    /// [`Filter`] to apply to the query.
    pub filter: Option<Filter>,
    /// Order by clauses for sorting the results, primary key first.
    pub order_by: Vec<(&'static str, OrderDirection)>,
    /// Limit on the number of records to return.
    pub limit: Option<usize>,
    /// Offset for pagination.
    pub offset: Option<usize>,
    /// Marker for the table schema type.
    _marker: PhantomData<T>,
}

impl<T> Default for Query<T>
where
    T: TableSchema,
{
    fn default() -> Self {
        Self {
            columns: Select::All,
            filter: None,
            order_by: Vec::new(),
            limit: None,
            offset: None,
            _marker: PhantomData,
        }
    }
}

impl<T> Query<T>
where
    T: TableSchema,
{
    /// Creates a new [`QueryBuilder`] for building a query.
    pub fn builder() -> QueryBuilder<T> {
        QueryBuilder::default()
    }

    /// Returns whether all columns are selected in the query.
    pub fn all_selected(&self) -> bool {
        matches!(self.columns, Select::All)
    }

    /// Returns the list of columns to be selected in the query.
    pub fn columns(&self) -> Vec<&'static str> {
        match &self.columns {
            Select::All => T::columns().iter().map(|col| col.name).collect(),
            Select::Columns(cols) => cols.clone(),
        }
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::tests::Member;

    #[test]
    fn test_should_build_default_query() {
        let query: Query<Member> = Query::default();
        assert!(matches!(query.columns, Select::All));
        assert!(query.filter.is_none());
        assert!(query.order_by.is_empty());
        assert!(query.limit.is_none());
        assert!(query.offset.is_none());
    }

    #[test]
    fn test_should_get_columns() {
        let query = Query::<Member>::default();
        let columns = query.columns();
        assert_eq!(columns, vec!["id", "username", "age", "team_id"]);

        let query = Query::<Member> {
            columns: Select::Columns(vec!["id"]),
            ..Default::default()
        };

        let columns = query.columns();
        assert_eq!(columns, vec!["id"]);
    }

    #[test]
    fn test_should_check_all_selected() {
        let query = Query::<Member>::default();
        assert!(query.all_selected());
    }
}
