//! The evaluation engine.
//!
//! A [`Database`] owns the record store and exposes the typed operations
//! over it: insert with integrity checks, filtered and sorted selects,
//! joins, bulk updates and bulk deletes.
//!
//! Every select materializes its result set before returning, so results
//! are a snapshot: a bulk update or delete issued afterwards never changes
//! a result set already in the caller's hands, only a re-fetch observes it.

mod integrity;

use std::cmp::Ordering;
use std::collections::HashSet;

use tracing::debug;

use self::integrity::InsertIntegrityValidator;
use crate::join::{self, JoinQuery};
use crate::query::{field_value, Filter, OrderDirection, Query, QueryError};
use crate::row::{Row, Selection};
use crate::store::{RecordId, RecordStore};
use crate::table::{ColumnDef, InsertRecord, TableRecord, TableSchema, UpdateRecord};
use crate::value::Value;
use crate::RelqResult;

/// An in-memory relational database over registered tables.
#[derive(Debug, Default)]
pub struct Database {
    store: RecordStore,
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a table so records can be stored in it.
    pub fn register<T>(&mut self)
    where
        T: TableSchema,
    {
        self.store.register(T::table_name(), T::columns());
        debug!(table = T::table_name(), "registered table");
    }

    pub(crate) fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Inserts a record, validating integrity first, and returns the
    /// surrogate key the store assigned to it.
    pub fn insert<T>(&mut self, record: T::Insert) -> RelqResult<RecordId>
    where
        T: TableSchema,
    {
        let values = record.into_values();
        InsertIntegrityValidator::<T>::new(&self.store).validate(&values)?;
        let id = self.store.insert_row(T::table_name(), values)?;
        debug!(table = T::table_name(), %id, "inserted record");
        Ok(id)
    }

    /// Looks up a single record by its surrogate key.
    pub fn get<T>(&self, id: RecordId) -> RelqResult<T::Record>
    where
        T: TableSchema,
    {
        let row = self.store.get(T::table_name(), id)?;
        Ok(T::Record::from_values(&zip_columns::<T>(&row.values)))
    }

    /// Evaluates a query and returns the matching records.
    ///
    /// The pipeline is filter, then sort, then offset and limit, then column
    /// projection. Unselected columns map to `None` fields on the records.
    pub fn select<T>(&self, query: Query<T>) -> RelqResult<Vec<T::Record>>
    where
        T: TableSchema,
    {
        let selected = query.columns();
        if !query.all_selected() {
            for column in &selected {
                if T::column(column).is_none() {
                    return Err(QueryError::UnknownColumn(column.to_string()).into());
                }
            }
        }

        let rows = self.paged_values(&query)?;
        debug!(
            table = T::table_name(),
            records = rows.len(),
            "evaluated select"
        );
        Ok(rows
            .into_iter()
            .map(|(_, mut values)| {
                if !query.all_selected() {
                    values.retain(|(col, _)| selected.contains(&col.name));
                }
                T::Record::from_values(&values)
            })
            .collect())
    }

    /// Evaluates a query and returns the first matching record, if any.
    pub fn select_one<T>(&self, mut query: Query<T>) -> RelqResult<Option<T::Record>>
    where
        T: TableSchema,
    {
        query.limit = Some(1);
        Ok(self.select(query)?.into_iter().next())
    }

    /// Evaluates a query and returns flat rows shaped by the selection.
    ///
    /// The selection drives the output entirely; the query's own column
    /// projection is ignored. Aliases become the output names.
    pub fn select_rows<T>(&self, selection: &Selection, query: Query<T>) -> RelqResult<Vec<Row>>
    where
        T: TableSchema,
    {
        for expr in selection.iter() {
            if T::column(expr.column).is_none() {
                return Err(QueryError::UnknownColumn(expr.column.to_string()).into());
            }
        }

        let rows = self.paged_values(&query)?;
        let mut output = Vec::with_capacity(rows.len());
        for (_, values) in rows {
            let mut row = Vec::with_capacity(selection.len());
            for expr in selection.iter() {
                row.push((
                    expr.output_name().to_string(),
                    field_value(&values, expr.column)?.clone(),
                ));
            }
            output.push(Row::new(row));
        }
        Ok(output)
    }

    /// Counts the records matching a filter.
    pub fn count<T>(&self, filter: Option<Filter>) -> RelqResult<u64>
    where
        T: TableSchema,
    {
        Ok(self.matching_rows::<T>(filter.as_ref())?.len() as u64)
    }

    /// Evaluates a join and returns typed record pairs. The right record is
    /// absent for unmatched left rows of a left outer join.
    pub fn join<L, R>(&self, join: &JoinQuery<L, R>) -> RelqResult<Vec<(L::Record, Option<R::Record>)>>
    where
        L: TableSchema,
        R: TableSchema,
    {
        Ok(join::evaluate(&self.store, join)?
            .into_iter()
            .map(|pair| {
                (
                    L::Record::from_values(&pair.left),
                    pair.right.map(|right| R::Record::from_values(&right)),
                )
            })
            .collect())
    }

    /// Evaluates a join and returns flat rows with table-qualified output
    /// names, such as `members.username`. Columns of an absent right side
    /// are NULL.
    pub fn join_rows<L, R>(&self, join: &JoinQuery<L, R>) -> RelqResult<Vec<Row>>
    where
        L: TableSchema,
        R: TableSchema,
    {
        let pairs = join::evaluate(&self.store, join)?;
        let mut output = Vec::with_capacity(pairs.len());
        for pair in pairs {
            let mut row = Vec::with_capacity(L::columns().len() + R::columns().len());
            for (col, value) in pair.left {
                row.push((format!("{}.{}", L::table_name(), col.name), value));
            }
            match pair.right {
                Some(right) => {
                    for (col, value) in right {
                        row.push((format!("{}.{}", R::table_name(), col.name), value));
                    }
                }
                None => {
                    for col in R::columns() {
                        row.push((format!("{}.{}", R::table_name(), col.name), Value::Null));
                    }
                }
            }
            output.push(Row::new(row));
        }
        Ok(output)
    }

    /// Applies a bulk update to every record matching the patch's where
    /// clause and returns the number of records written.
    ///
    /// Every new value is computed before anything is written, so a failing
    /// assignment leaves the table untouched.
    pub fn update<U>(&mut self, patch: U) -> RelqResult<u64>
    where
        U: UpdateRecord,
    {
        let assignments = patch.assignments();
        for (col, _) in &assignments {
            if col.primary_key {
                return Err(QueryError::InvalidQuery(format!(
                    "column '{}' holds the surrogate key and cannot be updated",
                    col.name
                ))
                .into());
            }
        }

        let filter = patch.where_clause();
        let matched = self.matching_rows::<U::Schema>(filter.as_ref())?;

        let mut updates = Vec::with_capacity(matched.len());
        for (id, values) in &matched {
            let mut row_updates = Vec::with_capacity(assignments.len());
            for (col, assignment) in &assignments {
                let index = U::Schema::columns()
                    .iter()
                    .position(|c| c.name == col.name)
                    .ok_or_else(|| QueryError::UnknownColumn(col.name.to_string()))?;
                row_updates.push((index, assignment.apply(col, &values[index].1)?));
            }
            updates.push((*id, row_updates));
        }

        let count = updates.len() as u64;
        for (id, row_updates) in updates {
            self.store.update_row(U::Schema::table_name(), id, |values| {
                for (index, value) in row_updates {
                    values[index] = value;
                }
            })?;
        }
        debug!(table = U::Schema::table_name(), count, "applied bulk update");
        Ok(count)
    }

    /// Deletes every record matching the filter and returns the count.
    /// Without a filter the whole table is emptied.
    pub fn delete<T>(&mut self, filter: Option<Filter>) -> RelqResult<u64>
    where
        T: TableSchema,
    {
        let ids: HashSet<RecordId> = self
            .matching_rows::<T>(filter.as_ref())?
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        let count = self
            .store
            .delete_where(T::table_name(), |row| ids.contains(&row.id))?;
        debug!(table = T::table_name(), count, "applied bulk delete");
        Ok(count)
    }

    /// Scans a table and keeps the rows matching the filter, in insertion
    /// order.
    fn matching_rows<T>(
        &self,
        filter: Option<&Filter>,
    ) -> RelqResult<Vec<(RecordId, Vec<(ColumnDef, Value)>)>>
    where
        T: TableSchema,
    {
        let mut matched = Vec::new();
        for row in self.store.scan(T::table_name())? {
            let values = zip_columns::<T>(&row.values);
            if let Some(filter) = filter {
                if !filter.matches(&values)? {
                    continue;
                }
            }
            matched.push((row.id, values));
        }
        Ok(matched)
    }

    /// Filters, sorts and paginates, leaving projection to the caller.
    fn paged_values<T>(
        &self,
        query: &Query<T>,
    ) -> RelqResult<Vec<(RecordId, Vec<(ColumnDef, Value)>)>>
    where
        T: TableSchema,
    {
        for (field, _) in &query.order_by {
            if T::column(field).is_none() {
                return Err(QueryError::UnknownColumn(field.to_string()).into());
            }
        }

        let mut matched = self.matching_rows::<T>(query.filter.as_ref())?;
        if !query.order_by.is_empty() {
            // stable sort keeps insertion order between equal keys
            matched.sort_by(|(_, a), (_, b)| order_compare(a, b, &query.order_by));
        }

        let offset = query.offset.unwrap_or(0);
        let iter = matched.into_iter().skip(offset);
        Ok(match query.limit {
            Some(limit) => iter.take(limit).collect(),
            None => iter.collect(),
        })
    }
}

fn zip_columns<T>(values: &[Value]) -> Vec<(ColumnDef, Value)>
where
    T: TableSchema,
{
    T::columns()
        .iter()
        .copied()
        .zip(values.iter().cloned())
        .collect()
}

/// Compares two rows over a list of order-by keys. NULLs sort after all
/// non-NULL values for both directions.
fn order_compare(
    a: &[(ColumnDef, Value)],
    b: &[(ColumnDef, Value)],
    order_by: &[(&'static str, OrderDirection)],
) -> Ordering {
    for (field, direction) in order_by {
        let a_value = sort_key(a, field);
        let b_value = sort_key(b, field);
        let ordering = match (a_value, b_value) {
            (Some(x), Some(y)) => match direction {
                OrderDirection::Ascending => x.cmp(y),
                OrderDirection::Descending => y.cmp(x),
            },
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// The sortable value of a column, with NULL collapsed to `None`.
fn sort_key<'a>(values: &'a [(ColumnDef, Value)], field: &str) -> Option<&'a Value> {
    values
        .iter()
        .find(|(col, _)| col.name == field)
        .map(|(_, value)| value)
        .filter(|value| !value.is_null())
}
